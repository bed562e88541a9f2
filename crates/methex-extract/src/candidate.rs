//! Transient candidate values. Never persisted.

use serde::Serialize;

use methex_common::{FieldType, SectionLabel};

/// A parsed candidate value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Label(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            FieldValue::Label(l) => Some(l),
            FieldValue::Number(_) => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Label(l) => f.write_str(l),
        }
    }
}

/// A raw match for one field, located in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub field_type: FieldType,
    /// Matched text as it appears in the document
    pub raw_value: String,
    pub normalized_value: FieldValue,
    pub section_label: SectionLabel,
    pub section_index: usize,
    /// Absolute byte offset of the match start
    pub offset: usize,
    pub end_offset: usize,
    pub pattern_specificity: f64,
}

/// The three signals feeding the context score, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContextFeatures {
    pub section_priority: f64,
    pub causal_proximity: f64,
    pub pattern_specificity: f64,
}

impl ContextFeatures {
    pub fn as_array(&self) -> [f64; 3] {
        [self.section_priority, self.causal_proximity, self.pattern_specificity]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub features: ContextFeatures,
    /// Higher means stronger contextual evidence; in [0, 1]
    pub context_score: f64,
}

/// An auxiliary mention (symptom, exposure route, time to improvement).
/// Same shape as a candidate but outside the persisted field set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mention {
    pub value: FieldValue,
    pub section_label: SectionLabel,
    pub section_index: usize,
    pub offset: usize,
    pub end_offset: usize,
    pub specificity: f64,
}
