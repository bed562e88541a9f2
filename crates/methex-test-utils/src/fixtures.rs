//! Case-report texts used across integration tests.

/// Benzocaine is named right after a causal phrase; dapsone only appears as
/// a home medication in a separate sentence.
pub const BENZOCAINE_VS_DAPSONE: &str = "\
Case Presentation
A 62-year-old man developed cyanosis after topical benzocaine spray before endoscopy. \
He had been taking dapsone for years.";

/// Benzocaine follows "after"; dapsone sits in the next clause.
pub const BENZOCAINE_APPLICATION: &str =
    "cyanosis occurred after benzocaine application; patient also has history of dapsone allergy";

pub const METHYLENE_BLUE_INFUSION: &str = "The patient was treated with methylene blue infusion.";

pub const METH_LEVEL_42: &str = "The methemoglobin level was 42.3%.";

pub const METH_LEVEL_150: &str = "The methemoglobin level was 150%.";

/// An implausible reading followed by a plausible repeat.
pub const METH_LEVEL_REPEAT: &str =
    "The methemoglobin level was 150%. Repeat MetHb was 40% after the sample was redrawn.";

/// Pulse oximetry percentages near the disease name.
pub const SATURATION_GAP: &str = "\
Case Report
Methemoglobinemia with an SpO2 of 85% was suspected. Co-oximetry showed MetHb of 32%.";

pub const SATURATION_PARENTHETICAL: &str =
    "Case Report\nMethemoglobinemia was suspected (SpO2 85%). MetHb was 32%.";

/// Infant age given in months.
pub const INFANT_AGE_MONTHS: &str = "The infant, aged 6 months, was cyanotic after drinking well water.";

/// Full report with headings. Background mentions a different trigger,
/// treatment and a symptom that must not leak into the record.
pub const STRUCTURED_CASE_REPORT: &str = "\
Acquired methemoglobinemia after dapsone: a case report

Introduction
Methemoglobinemia is most often caused by local anesthetics such as lidocaine. \
Headache is a frequent early complaint. Ascorbic acid is an alternative therapy.

Case Presentation
A 34-year-old woman presented with dyspnea and cyanosis three days after starting dapsone. \
Pulse oximetry read 85% despite supplemental oxygen. \
Arterial blood gas showed a methemoglobin level of 28.4%. G6PD levels were normal. \
She received methylene blue 1 mg/kg intravenously and cyanosis resolved within 2 hours. \
She recovered and was discharged home on day 3.

Discussion
Dapsone-induced methemoglobinemia may recur; peak levels above 30% are reported in the literature.
";

/// Case with no G6PD mention at all.
pub const NO_G6PD_CASE: &str = "\
Case Report
A 45-year-old man ingested an aniline dye and became cyanotic. \
His methemoglobin level was 38%. He was treated with methylene blue 2 mg/kg and recovered.";

/// Nothing extractable.
pub const EMPTY_OF_FIELDS: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

/// `(id, text)` pairs for batch tests.
pub fn corpus() -> Vec<(&'static str, &'static str)> {
    vec![
        ("1001", BENZOCAINE_VS_DAPSONE),
        ("1002", METHYLENE_BLUE_INFUSION),
        ("1003", METH_LEVEL_42),
        ("1004", METH_LEVEL_150),
        ("1005", STRUCTURED_CASE_REPORT),
        ("1006", NO_G6PD_CASE),
        ("1007", EMPTY_OF_FIELDS),
        ("1008", ""),
        ("1009", BENZOCAINE_APPLICATION),
        ("1010", SATURATION_GAP),
        ("1011", INFANT_AGE_MONTHS),
    ]
}
