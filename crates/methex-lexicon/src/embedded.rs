//! Built-in lexicon for methemoglobinemia case reports.
//!
//! Tables are `(pattern, canonical label, specificity)`. Short or ambiguous
//! aliases carry low specificity so they only win when nothing better is
//! nearby.

use std::collections::BTreeMap;

use methex_common::{FieldType, SectionLabel};

use crate::rules::Rule;
use crate::store::{HeadingRule, LexiconStore};

const HEADINGS: &[(&str, SectionLabel)] = &[
    ("background", SectionLabel::Background),
    ("introduction", SectionLabel::Background),
    ("case presentation", SectionLabel::CasePresentation),
    ("case report", SectionLabel::CasePresentation),
    ("case description", SectionLabel::CasePresentation),
    ("case summary", SectionLabel::CasePresentation),
    ("case history", SectionLabel::CasePresentation),
    ("case details", SectionLabel::CasePresentation),
    ("case", SectionLabel::CasePresentation),
    ("clinical presentation", SectionLabel::CasePresentation),
    ("patient presentation", SectionLabel::CasePresentation),
    ("discussion", SectionLabel::Discussion),
    ("conclusion", SectionLabel::Discussion),
    ("conclusions", SectionLabel::Discussion),
    ("comment", SectionLabel::Discussion),
    ("abstract", SectionLabel::Other),
    ("summary", SectionLabel::Other),
    ("keywords", SectionLabel::Other),
    ("methods", SectionLabel::Other),
    ("results", SectionLabel::Other),
    ("learning points", SectionLabel::Other),
    ("acknowledgements", SectionLabel::Other),
    ("acknowledgments", SectionLabel::Other),
    ("funding", SectionLabel::Other),
    ("conflicts of interest", SectionLabel::Other),
    ("references", SectionLabel::Other),
];

const CAUSAL_PHRASES: &[&str] = &[
    "due to",
    "induced by",
    "induced",
    "after",
    "secondary to",
    "caused by",
    "following",
    "associated with",
    "exposure to",
    "ingestion of",
    "overdose",
    "administration of",
    "use of",
    "received",
];

const TRIGGERS: &[(&str, &str, f64)] = &[
    ("acetaminophen", "Acetaminophen", 1.0),
    ("paracetamol", "Acetaminophen", 1.0),
    ("tylenol", "Acetaminophen", 0.8),
    ("apap", "Acetaminophen", 0.6),
    ("benzocaine", "Benzocaine", 1.0),
    ("hurricaine", "Benzocaine", 0.9),
    ("hurricane spray", "Benzocaine", 0.9),
    ("orajel", "Benzocaine", 0.9),
    ("dapsone", "Dapsone", 1.0),
    ("aczone", "Dapsone", 0.9),
    ("lidocaine", "Lidocaine", 1.0),
    ("lignocaine", "Lidocaine", 1.0),
    ("xylocaine", "Lidocaine", 0.9),
    ("prilocaine", "Prilocaine", 1.0),
    ("sodium nitrite", "Nitrates", 1.0),
    ("amyl nitrite", "Nitrates", 1.0),
    ("nitrite", "Nitrates", 0.9),
    ("nitrate", "Nitrates", 0.9),
    ("poppers", "Nitrates", 0.8),
    ("nitrous", "Nitrates", 0.5),
    ("phenazopyridine", "Phenazopyridine", 1.0),
    ("pyridium", "Phenazopyridine", 0.9),
    ("azo", "Phenazopyridine", 0.4),
    ("aniline dye", "Aniline", 1.0),
    ("aniline", "Aniline", 0.9),
    ("metoclopramide", "Metoclopramide", 1.0),
    ("reglan", "Metoclopramide", 0.9),
    ("primaquine", "Primaquine", 1.0),
    ("sulfamethoxazole", "Sulfonamides", 1.0),
    ("trimethoprim", "Sulfonamides", 0.8),
    ("sulfonamide", "Sulfonamides", 0.9),
    ("sulfa", "Sulfonamides", 0.5),
    ("chloroquine", "Chloroquine", 1.0),
    ("hydroxychloroquine", "Chloroquine", 1.0),
    ("rasburicase", "Rasburicase", 1.0),
    ("elitek", "Rasburicase", 0.9),
    ("congenital methemoglobinemia", "Genetic", 1.0),
    ("hereditary methemoglobinemia", "Genetic", 1.0),
    ("cytochrome b5 reductase deficiency", "Genetic", 1.0),
    ("nadh", "Genetic", 0.5),
    ("cytochrome b5", "Genetic", 0.6),
    ("hemoglobin m", "Genetic", 0.9),
    ("congenital", "Genetic", 0.4),
    ("hereditary", "Genetic", 0.4),
    ("familial", "Genetic", 0.4),
    ("genetic", "Genetic", 0.3),
];

const TREATMENTS: &[(&str, &str, f64)] = &[
    ("methylene blue", "Methylene Blue", 1.0),
    ("methylthioninium chloride", "Methylene Blue", 1.0),
    ("methylthioninium", "Methylene Blue", 1.0),
    ("urolene blue", "Methylene Blue", 0.9),
    ("provayblue", "Methylene Blue", 0.9),
    ("mb", "Methylene Blue", 0.5),
    ("ascorbic acid", "Vitamin C", 1.0),
    ("vitamin c", "Vitamin C", 0.9),
    ("ascorbate", "Vitamin C", 0.8),
    ("exchange transfusion", "Exchange Transfusion", 1.0),
    ("blood exchange", "Exchange Transfusion", 0.8),
    ("hyperbaric oxygen", "Oxygen", 0.9),
    ("high-flow oxygen", "Oxygen", 0.7),
    ("supplemental oxygen", "Oxygen", 0.7),
    ("oxygen therapy", "Oxygen", 0.7),
    ("supportive care", "Supportive", 0.5),
    ("conservative management", "Supportive", 0.5),
    ("observation", "Supportive", 0.3),
];

const SYMPTOMS: &[(&str, &str, f64)] = &[
    ("cyanosis", "Cyanosis", 1.0),
    ("cyanotic", "Cyanosis", 1.0),
    ("bluish", "Cyanosis", 0.7),
    ("blue discoloration", "Cyanosis", 0.8),
    ("dyspnea", "Dyspnea", 1.0),
    ("dyspnoea", "Dyspnea", 1.0),
    ("shortness of breath", "Dyspnea", 1.0),
    ("difficulty breathing", "Dyspnea", 0.9),
    ("respiratory distress", "Dyspnea", 0.8),
    ("confusion", "Altered Mental Status", 0.8),
    ("altered mental", "Altered Mental Status", 1.0),
    ("lethargy", "Altered Mental Status", 0.8),
    ("lethargic", "Altered Mental Status", 0.8),
    ("unconscious", "Altered Mental Status", 0.9),
    ("unresponsive", "Altered Mental Status", 0.9),
    ("coma", "Altered Mental Status", 0.9),
    ("headache", "Headache", 1.0),
    ("dizziness", "Dizziness", 1.0),
    ("dizzy", "Dizziness", 0.9),
    ("lightheaded", "Dizziness", 0.8),
    ("nausea", "Nausea", 1.0),
    ("nauseous", "Nausea", 0.9),
    ("vomiting", "Nausea", 0.8),
    ("seizure", "Seizure", 1.0),
    ("convulsion", "Seizure", 1.0),
    ("chest pain", "Chest Pain", 1.0),
    ("angina", "Chest Pain", 0.8),
    ("tachycardia", "Tachycardia", 0.9),
    ("fatigue", "Fatigue", 0.7),
];

const ROUTES: &[(&str, &str, f64)] = &[
    ("topical", "Topical", 1.0),
    ("topically", "Topical", 1.0),
    ("spray", "Topical", 0.7),
    ("gel", "Topical", 0.5),
    ("oral", "Oral", 0.9),
    ("orally", "Oral", 1.0),
    ("ingested", "Oral", 1.0),
    ("ingestion", "Oral", 1.0),
    ("swallowed", "Oral", 0.9),
    ("po", "Oral", 0.4),
    ("intravenous", "Intravenous", 1.0),
    ("intravenously", "Intravenous", 1.0),
    ("iv", "Intravenous", 0.6),
    ("infusion", "Intravenous", 0.5),
    ("inhaled", "Inhalation", 1.0),
    ("inhalation", "Inhalation", 1.0),
    ("subcutaneous", "Subcutaneous", 1.0),
    ("subcutaneously", "Subcutaneous", 1.0),
    ("subq", "Subcutaneous", 0.7),
];

const OUTCOMES: &[(&str, &str, f64)] = &[
    ("full recovery", "Recovered", 1.0),
    ("uneventful recovery", "Recovered", 1.0),
    ("recovered", "Recovered", 0.9),
    ("discharged home", "Recovered", 0.9),
    ("discharged", "Recovered", 0.8),
    ("resolved", "Recovered", 0.6),
    ("improved", "Recovered", 0.5),
    ("passed away", "Fatal", 1.0),
    ("died", "Fatal", 1.0),
    ("expired", "Fatal", 0.8),
    ("fatal", "Fatal", 0.7),
    ("death", "Fatal", 0.6),
    ("mortality", "Fatal", 0.3),
    ("transferred", "Admitted", 0.5),
    ("admitted", "Admitted", 0.4),
    ("lost to follow-up", "Unknown", 0.6),
];

const GENDER_NOUNS: &[(&str, &str, f64)] = &[
    ("woman", "Female", 0.6),
    ("female", "Female", 0.6),
    ("girl", "Female", 0.6),
    ("lady", "Female", 0.5),
    ("man", "Male", 0.6),
    ("male", "Male", 0.6),
    ("boy", "Male", 0.6),
    ("gentleman", "Male", 0.5),
    ("she", "Female", 0.3),
    ("her", "Female", 0.3),
    ("he", "Male", 0.3),
    ("his", "Male", 0.3),
    ("him", "Male", 0.3),
];

/// Any accepted spelling of methemoglobin.
const METH_TERM: &str = r"(?:met-?hb|metha?emoglobin)";
const NUM: &str = r"(\d{1,3}(?:\.\d+)?)";
/// Words between the term and its value; no digits, so another number cannot be skipped.
const FILLER: &str = r"[^.;%\d]{0,40}?";
/// Oxygen saturation readings share the percent unit.
const SATURATION: &str = r"(?i)\bsp\s*o2\b|saturation|\bsats?\b|pulse\s+ox";
const G6PD_TERM: &str =
    r"(?:g6pd|g-6-pd|glucose-6-phosphate\s+dehydrogenase(?:\s*\(g6pd\))?)";
const MB_TERM: &str = r"(?:methylene\s+blue|methylthioninium(?:\s+chloride)?|mb)";
const DOSE: &str = r"(\d+(?:\.\d+)?)(?:\s*[-–]\s*\d+(?:\.\d+)?)?\s*mg\s*/\s*kg\b";

fn meth_rules() -> Vec<Rule> {
    vec![
        Rule::regex(
            &format!(r"(?i)\b(?:peak|maximum|max|highest)\s+{METH_TERM}\b{FILLER}{NUM}\s*%"),
            1.0,
        )
        .with_exclude(SATURATION),
        Rule::regex(&format!(r"(?i)\b{METH_TERM}\b{FILLER}{NUM}\s*%"), 0.9).with_exclude(SATURATION),
        Rule::regex(&format!(r"(?i)\b{NUM}\s*%\s*(?:of\s+)?{METH_TERM}"), 0.85),
        Rule::regex(&format!(r"(?i)\bmeasured\s+(?:at\s+)?{NUM}\s*%"), 0.4),
        Rule::regex(
            &format!(
                r"(?i)\b{METH_TERM}\b\s*(?:level|concentration|fraction)?\s*(?:of|was|:|=)?\s*{NUM}(?:[\s,;)]|\.(?:\s|$)|$)"
            ),
            0.4,
        ),
        // The disease name only anchors a value written right after it
        Rule::regex(&format!(r"(?i)\b{METH_TERM}a?emia\b[^.;%\d]{{0,12}}?{NUM}\s*%"), 0.3)
            .with_exclude(SATURATION),
    ]
}

fn age_rules() -> Vec<Rule> {
    let aged = r"(?i)\baged?\s*:?\s*(\d{1,3})[\s-]*";
    vec![
        Rule::regex(r"(?i)\b(\d{1,3})[\s-]*(?:year|yr)s?[\s-]*old\b", 1.0),
        Rule::regex(r"(?i)\b(\d{1,3})\s*y/?o\b", 0.9),
        Rule::regex(r"(?i)\b(\d{1,2})[\s-]*months?[\s-]*old\b", 0.9).with_multiplier(1.0 / 12.0),
        Rule::regex(r"(?i)\b(\d{1,3})[\s-]*weeks?[\s-]*old\b", 0.9).with_multiplier(1.0 / 52.0),
        Rule::regex(r"(?i)\b(\d{1,3})[\s-]*days?[\s-]*old\b", 0.9).with_multiplier(1.0 / 365.0),
        Rule::regex(&format!(r"{aged}(?:months?|mos?)\b"), 0.9).with_multiplier(1.0 / 12.0),
        Rule::regex(&format!(r"{aged}weeks?\b"), 0.9).with_multiplier(1.0 / 52.0),
        Rule::regex(&format!(r"{aged}days?\b"), 0.9).with_multiplier(1.0 / 365.0),
        Rule::regex(r"(?i)\baged?\s*:?\s*(\d{1,3})\b", 0.8),
    ]
}

fn gender_rules() -> Vec<Rule> {
    let age_prefix = r"(?i)\b\d{1,3}[\s-]*(?:year|month|week|day)s?[\s-]*old\s+";
    let mut rules = vec![
        Rule::labelled_regex(&format!(r"{age_prefix}(?:woman|female|girl|lady)\b"), "Female", 1.0),
        Rule::labelled_regex(&format!(r"{age_prefix}(?:man|male|boy|gentleman)\b"), "Male", 1.0),
    ];
    rules.extend(phrase_rules(GENDER_NOUNS));
    rules
}

fn g6pd_rules() -> Vec<Rule> {
    vec![
        Rule::labelled_regex(
            &format!(r"(?i)\b{G6PD_TERM}\s+deficiency\s+(?:was|had\s+been|has\s+been|is)\s+(?:ruled\s+out|excluded)"),
            "Normal",
            1.0,
        ),
        Rule::labelled_regex(
            &format!(r"(?i)\b(?:no|without|negative\s+for)\s+(?:evidence\s+of\s+)?{G6PD_TERM}\s+deficiency"),
            "Normal",
            1.0,
        ),
        Rule::labelled_regex(
            &format!(
                r"(?i)\b{G6PD_TERM}(?:\s+(?:activity|level|levels|screen|screening|assay|test|testing))?\s+(?:was|were|is)\s+(?:normal|within\s+normal\s+limits|negative|unremarkable)"
            ),
            "Normal",
            1.0,
        ),
        Rule::labelled_regex(&format!(r"(?i)\bnormal\s+{G6PD_TERM}"), "Normal", 0.9),
        Rule::labelled_regex(&format!(r"(?i)\b{G6PD_TERM}[\s-]+deficien(?:cy|t)"), "Deficient", 0.8),
        Rule::labelled_regex(&format!(r"(?i)\bdeficien(?:cy|t)\s+(?:in|of)\s+{G6PD_TERM}"), "Deficient", 0.8),
        Rule::labelled_regex(&format!(r"(?i)\b{G6PD_TERM}"), "Mentioned", 0.3),
    ]
}

fn mb_dose_rules() -> Vec<Rule> {
    vec![
        Rule::regex(&format!(r"(?i)\b{MB_TERM}\b[^.;]{{0,40}}?\b{DOSE}"), 1.0),
        Rule::regex(&format!(r"(?i)\b{DOSE}[^.;]{{0,40}}?\b{MB_TERM}\b"), 0.9),
        Rule::regex(&format!(r"(?i)\b{DOSE}"), 0.5),
    ]
}

fn time_rules() -> Vec<Rule> {
    let improved = r"(?i)\b(?:improved|improvement|resolved|resolution)\s+(?:within|after|in)\s+(\d+(?:\.\d+)?)\s*";
    let before = r"(?i)\b(\d+(?:\.\d+)?)\s*";
    let after = r"\s+(?:after|post)\s+(?:treatment|administration|infusion)";
    vec![
        Rule::regex(&format!(r"{improved}(?:hours?|hrs?)\b"), 1.0).with_multiplier(60.0),
        Rule::regex(&format!(r"{improved}(?:minutes?|mins?)\b"), 1.0),
        Rule::regex(&format!(r"{before}(?:hours?|hrs?){after}"), 0.9).with_multiplier(60.0),
        Rule::regex(&format!(r"{before}(?:minutes?|mins?){after}"), 0.9),
    ]
}

fn phrase_rules(table: &[(&str, &str, f64)]) -> Vec<Rule> {
    table
        .iter()
        .map(|(pattern, label, specificity)| Rule::phrase(pattern, label, *specificity))
        .collect()
}

pub(crate) fn store() -> LexiconStore {
    let mut fields = BTreeMap::new();
    fields.insert(FieldType::MethLevel, meth_rules());
    fields.insert(FieldType::Trigger, phrase_rules(TRIGGERS));
    fields.insert(FieldType::Treatment, phrase_rules(TREATMENTS));
    fields.insert(FieldType::Age, age_rules());
    fields.insert(FieldType::Gender, gender_rules());
    fields.insert(FieldType::Outcome, phrase_rules(OUTCOMES));
    fields.insert(FieldType::G6pdStatus, g6pd_rules());
    fields.insert(FieldType::MbDose, mb_dose_rules());

    LexiconStore {
        headings: HEADINGS.iter().map(|(p, l)| HeadingRule::new(p, *l)).collect(),
        causal_phrases: CAUSAL_PHRASES.iter().map(|p| p.to_string()).collect(),
        fields,
        symptoms: phrase_rules(SYMPTOMS),
        routes: phrase_rules(ROUTES),
        time_to_improvement: time_rules(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::CompiledRules;

    fn values(rules: Vec<Rule>, text: &str) -> Vec<String> {
        let compiled = CompiledRules::compile(rules).unwrap();
        compiled
            .find_all(text)
            .into_iter()
            .map(|m| match m.value {
                Some((s, e)) => text[s..e].to_string(),
                None => compiled.rule(m.rule).label.clone().unwrap_or_default(),
            })
            .collect()
    }

    #[test]
    fn test_meth_percentage() {
        assert_eq!(values(meth_rules(), "The methemoglobin level was 42.3%."), vec!["42.3"]);
        assert_eq!(values(meth_rules(), "MetHb of 150%"), vec!["150"]);
        assert_eq!(values(meth_rules(), "a Met-Hb fraction of 35 %"), vec!["35"]);
        assert_eq!(values(meth_rules(), "with 28% methaemoglobin"), vec!["28"]);
    }

    #[test]
    fn test_saturation_not_read_as_meth() {
        assert_eq!(
            values(meth_rules(), "Methemoglobinemia with an SpO2 of 85% was suspected. Co-oximetry showed MetHb of 32%."),
            vec!["32"]
        );
        assert_eq!(
            values(meth_rules(), "Methemoglobinemia was suspected (SpO2 85%). MetHb was 32%."),
            vec!["32"]
        );
        assert_eq!(
            values(meth_rules(), "MetHb was sent while oxygen saturation was 88%. MetHb was 32%."),
            vec!["32"]
        );
    }

    #[test]
    fn test_disease_name_anchors_adjacent_value_only() {
        let compiled = CompiledRules::compile(meth_rules()).unwrap();
        let text = "severe methemoglobinemia (45%)";
        let hits = compiled.find_all(text);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].specificity, 0.3);
    }

    #[test]
    fn test_meth_without_percent_sign() {
        assert_eq!(values(meth_rules(), "methemoglobin level was 18."), vec!["18"]);
    }

    #[test]
    fn test_g6pd_negation() {
        assert_eq!(values(g6pd_rules(), "G6PD deficiency was ruled out."), vec!["Normal"]);
        assert_eq!(values(g6pd_rules(), "She had no G6PD deficiency."), vec!["Normal"]);
        assert_eq!(values(g6pd_rules(), "known G6PD-deficient patient"), vec!["Deficient"]);
        assert_eq!(values(g6pd_rules(), "G6PD levels were normal"), vec!["Normal"]);
        assert_eq!(values(g6pd_rules(), "G6PD testing was sent"), vec!["Mentioned"]);
    }

    #[test]
    fn test_gender_age_noun_most_specific() {
        let compiled = CompiledRules::compile(gender_rules()).unwrap();
        let hits = compiled.find_all("A 34-year-old woman presented");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].specificity, 1.0);
        assert_eq!(compiled.rule(hits[0].rule).label.as_deref(), Some("Female"));
    }

    #[test]
    fn test_infant_age_multiplier() {
        let compiled = CompiledRules::compile(age_rules()).unwrap();
        let hits = compiled.find_all("a 6-month-old infant");
        assert_eq!(hits.len(), 1);
        assert!((compiled.rule(hits[0].rule).multiplier - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_aged_with_unit_uses_unit_multiplier() {
        let compiled = CompiledRules::compile(age_rules()).unwrap();
        for (text, multiplier) in [
            ("The infant, aged 6 months, was cyanotic.", 1.0 / 12.0),
            ("Age: 8 months.", 1.0 / 12.0),
            ("aged 3 weeks", 1.0 / 52.0),
            ("aged 45 years", 1.0),
        ] {
            let hits = compiled.find_all(text);
            assert_eq!(hits.len(), 1, "{text}");
            assert!((compiled.rule(hits[0].rule).multiplier - multiplier).abs() < 1e-12, "{text}");
        }
    }

    #[test]
    fn test_mb_dose_prefers_named_drug() {
        let compiled = CompiledRules::compile(mb_dose_rules()).unwrap();
        let hits = compiled.find_all("methylene blue 1-2 mg/kg was given");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].specificity, 1.0);
    }

    #[test]
    fn test_no_bare_blue_symptom() {
        assert!(SYMPTOMS.iter().all(|(p, _, _)| *p != "blue"));
    }
}
