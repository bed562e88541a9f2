//! The persisted record schema.
//!
//! Column names and label spellings are stable: downstream dashboards read
//! `pmid, meth_level, trigger, treatment, age, gender, symptoms, outcome,
//! g6pd_status, mb_dose, data_quality_score`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Recovered,
    Fatal,
    Admitted,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum G6pdStatus {
    Deficient,
    Normal,
    Mentioned,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male   => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "male"   => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Recovered => "Recovered",
            Outcome::Fatal     => "Fatal",
            Outcome::Admitted  => "Admitted",
            Outcome::Unknown   => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "recovered" => Some(Outcome::Recovered),
            "fatal"     => Some(Outcome::Fatal),
            "admitted"  => Some(Outcome::Admitted),
            "unknown"   => Some(Outcome::Unknown),
            _ => None,
        }
    }

    /// Whether the outcome says something about the patient.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::Unknown)
    }
}

impl G6pdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            G6pdStatus::Deficient => "Deficient",
            G6pdStatus::Normal    => "Normal",
            G6pdStatus::Mentioned => "Mentioned",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "deficient" => Some(G6pdStatus::Deficient),
            "normal"    => Some(G6pdStatus::Normal),
            "mentioned" => Some(G6pdStatus::Mentioned),
            _ => None,
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(Gender, Outcome, G6pdStatus);

/// Field values of a record before it is sealed with a quality score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub meth_level: Option<f64>,
    pub trigger: Option<String>,
    pub treatment: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub symptoms: Option<String>,
    pub outcome: Option<Outcome>,
    pub g6pd_status: Option<G6pdStatus>,
    pub mb_dose: Option<f64>,
}

/// One row per document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredRecord {
    pmid: String,
    meth_level: Option<f64>,
    trigger: Option<String>,
    treatment: Option<String>,
    age: Option<u32>,
    gender: Option<Gender>,
    symptoms: Option<String>,
    outcome: Option<Outcome>,
    g6pd_status: Option<G6pdStatus>,
    mb_dose: Option<f64>,
    data_quality_score: f64,
}

impl StructuredRecord {
    pub fn new(pmid: impl Into<String>, fields: RecordFields, data_quality_score: f64) -> Self {
        let RecordFields {
            meth_level,
            trigger,
            treatment,
            age,
            gender,
            symptoms,
            outcome,
            g6pd_status,
            mb_dose,
        } = fields;

        Self {
            pmid: pmid.into(),
            meth_level,
            trigger,
            treatment,
            age,
            gender,
            symptoms,
            outcome,
            g6pd_status,
            mb_dose,
            data_quality_score: data_quality_score.clamp(0.0, 1.0),
        }
    }

    pub fn pmid(&self) -> &str { &self.pmid }
    pub fn meth_level(&self) -> Option<f64> { self.meth_level }
    pub fn trigger(&self) -> Option<&str> { self.trigger.as_deref() }
    pub fn treatment(&self) -> Option<&str> { self.treatment.as_deref() }
    pub fn age(&self) -> Option<u32> { self.age }
    pub fn gender(&self) -> Option<Gender> { self.gender }
    pub fn symptoms(&self) -> Option<&str> { self.symptoms.as_deref() }
    pub fn outcome(&self) -> Option<Outcome> { self.outcome }
    pub fn g6pd_status(&self) -> Option<G6pdStatus> { self.g6pd_status }
    pub fn mb_dose(&self) -> Option<f64> { self.mb_dose }
    pub fn data_quality_score(&self) -> f64 { self.data_quality_score }

    /// Whether the treatment matches `label`, ignoring case.
    pub fn treated_with(&self, label: &str) -> bool {
        self.treatment.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_column_order_and_labels() {
        let record = StructuredRecord::new(
            "12345",
            RecordFields {
                meth_level: Some(42.3),
                gender: Some(Gender::Female),
                outcome: Some(Outcome::Recovered),
                g6pd_status: Some(G6pdStatus::Normal),
                ..Default::default()
            },
            0.5,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"pmid":"12345","meth_level":42.3,"trigger":null,"treatment":null,"age":null,"gender":"Female","symptoms":null,"outcome":"Recovered","g6pd_status":"Normal","mb_dose":null,"data_quality_score":0.5}"#
        );
    }

    #[test]
    fn test_label_parsing_is_case_insensitive() {
        assert_eq!(Gender::from_label("male"), Some(Gender::Male));
        assert_eq!(Outcome::from_label("FATAL"), Some(Outcome::Fatal));
        assert_eq!(G6pdStatus::from_label("Deficient"), Some(G6pdStatus::Deficient));
        assert_eq!(G6pdStatus::from_label("Not mentioned"), None);
    }

    #[test]
    fn test_quality_score_clamped() {
        let record = StructuredRecord::new("1", RecordFields::default(), 1.7);
        assert_eq!(record.data_quality_score(), 1.0);
    }
}
