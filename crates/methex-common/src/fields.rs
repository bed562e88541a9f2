//! Field and section vocabularies shared by the lexicon, the extraction
//! pipeline and the persisted record schema.

use serde::{Deserialize, Serialize};

/// Structured fields resolved from a case report.
/// The set is closed: the persisted schema has exactly one column per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    MethLevel,
    Trigger,
    Treatment,
    Age,
    Gender,
    Outcome,
    G6pdStatus,
    MbDose,
}

impl FieldType {
    pub const ALL: [FieldType; 8] = [
        FieldType::MethLevel,
        FieldType::Trigger,
        FieldType::Treatment,
        FieldType::Age,
        FieldType::Gender,
        FieldType::Outcome,
        FieldType::G6pdStatus,
        FieldType::MbDose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::MethLevel  => "meth_level",
            FieldType::Trigger    => "trigger",
            FieldType::Treatment  => "treatment",
            FieldType::Age        => "age",
            FieldType::Gender     => "gender",
            FieldType::Outcome    => "outcome",
            FieldType::G6pdStatus => "g6pd_status",
            FieldType::MbDose     => "mb_dose",
        }
    }

    /// Fields whose candidates carry a parsed number rather than a label.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::MethLevel | FieldType::Age | FieldType::MbDose)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Section types inferred from case-report headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionLabel {
    Background,
    CasePresentation,
    Discussion,
    Other,
}

impl SectionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionLabel::Background       => "background",
            SectionLabel::CasePresentation => "case_presentation",
            SectionLabel::Discussion       => "discussion",
            SectionLabel::Other            => "other",
        }
    }

    /// Ordinal rank used for tie-breaking: case_presentation > discussion > other > background.
    pub fn rank(&self) -> u8 {
        match self {
            SectionLabel::CasePresentation => 3,
            SectionLabel::Discussion       => 2,
            SectionLabel::Other            => 1,
            SectionLabel::Background       => 0,
        }
    }
}

impl std::fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_rank_order() {
        assert!(SectionLabel::CasePresentation.rank() > SectionLabel::Discussion.rank());
        assert!(SectionLabel::Discussion.rank() > SectionLabel::Other.rank());
        assert!(SectionLabel::Other.rank() > SectionLabel::Background.rank());
    }

    #[test]
    fn test_field_type_serde_names_match_schema() {
        for field in FieldType::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_numeric_fields() {
        assert!(FieldType::MethLevel.is_numeric());
        assert!(FieldType::MbDose.is_numeric());
        assert!(!FieldType::Trigger.is_numeric());
    }
}
