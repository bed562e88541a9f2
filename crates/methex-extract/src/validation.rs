//! Advisory checks on produced records. Findings never change a record.

use serde::Serialize;

use methex_common::ValidationConfig;

use crate::record::{G6pdStatus, StructuredRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// MetHb above the review threshold (often fatal territory)
    HighMethLevel,
    /// MetHb unusually low for a published case
    LowMethLevel,
    /// MetHb equal to a common hour count (24, 48, ...)
    PossibleTimeValue,
    /// Methylene blue given despite G6PD deficiency
    G6pdDeficientWithMethyleneBlue,
    /// Methylene blue given in a congenital case
    GeneticTriggerWithMethyleneBlue,
    /// meth_level, trigger or treatment missing
    MissingCriticalData,
    LowQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

pub struct RecordValidator {
    config: ValidationConfig,
    methylene_blue_label: String,
}

impl RecordValidator {
    pub fn new(config: ValidationConfig, methylene_blue_label: impl Into<String>) -> Self {
        Self { config, methylene_blue_label: methylene_blue_label.into() }
    }

    pub fn validate(&self, record: &StructuredRecord) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mb = record.treated_with(&self.methylene_blue_label);

        if let Some(level) = record.meth_level() {
            if level > self.config.high_meth_level {
                issues.push(ValidationIssue::new(
                    IssueKind::HighMethLevel,
                    format!("MetHb {level}% exceeds {}%", self.config.high_meth_level),
                ));
            }
            if level < self.config.low_meth_level {
                issues.push(ValidationIssue::new(
                    IssueKind::LowMethLevel,
                    format!("MetHb {level}% below {}%", self.config.low_meth_level),
                ));
            }
            if self.config.suspicious_time_values.iter().any(|t| (t - level).abs() < 1e-9) {
                issues.push(ValidationIssue::new(
                    IssueKind::PossibleTimeValue,
                    format!("MetHb {level}% may be an hour count"),
                ));
            }
        }

        if mb && record.g6pd_status() == Some(G6pdStatus::Deficient) {
            issues.push(ValidationIssue::new(
                IssueKind::G6pdDeficientWithMethyleneBlue,
                "methylene blue given to a G6PD-deficient patient",
            ));
        }

        let genetic = record
            .trigger()
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.config.genetic_trigger_label));
        if mb && genetic {
            issues.push(ValidationIssue::new(
                IssueKind::GeneticTriggerWithMethyleneBlue,
                "methylene blue given for congenital methemoglobinemia",
            ));
        }

        let missing: Vec<&str> = [
            ("meth_level", record.meth_level().is_none()),
            ("trigger", record.trigger().is_none()),
            ("treatment", record.treatment().is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            issues.push(ValidationIssue::new(
                IssueKind::MissingCriticalData,
                format!("missing {}", missing.join(", ")),
            ));
        }

        if record.data_quality_score() < self.config.low_quality_score {
            issues.push(ValidationIssue::new(
                IssueKind::LowQuality,
                format!(
                    "quality {:.2} below {:.2}",
                    record.data_quality_score(),
                    self.config.low_quality_score
                ),
            ));
        }

        issues
    }
}
