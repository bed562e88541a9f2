//! Batch statistics derived strictly from produced records.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::record::{Outcome, StructuredRecord};

/// MetHb severity band: mild < 15%, moderate 15-30%, severe >= 30%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn from_meth_level(level: f64) -> Self {
        if level < 15.0 {
            Severity::Mild
        } else if level < 30.0 {
            Severity::Moderate
        } else {
            Severity::Severe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild     => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe   => "Severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethLevelStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl MethLevelStats {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let n = values.len();
        let median = if n % 2 == 0 {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        } else {
            values[n / 2]
        };
        Some(Self {
            count: n,
            mean: values.iter().sum::<f64>() / n as f64,
            median,
            min: values[0],
            max: values[n - 1],
        })
    }
}

/// Recovered / (treated with methylene blue and outcome known).
/// Both terms are reported so the rate can be checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveryRate {
    pub recovered: usize,
    pub denominator: usize,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_records: usize,
    /// Non-null count per column
    pub coverage: BTreeMap<String, usize>,
    pub meth_level: Option<MethLevelStats>,
    pub severity: BTreeMap<Severity, usize>,
    pub triggers: BTreeMap<String, usize>,
    pub treatments: BTreeMap<String, usize>,
    pub outcomes: BTreeMap<Outcome, usize>,
    pub methylene_blue_recovery: RecoveryRate,
    pub mean_quality_score: Option<f64>,
}

impl BatchSummary {
    pub fn from_records(records: &[StructuredRecord], methylene_blue_label: &str) -> Self {
        let mut coverage: BTreeMap<String, usize> = BTreeMap::new();
        let mut severity = BTreeMap::new();
        let mut triggers = BTreeMap::new();
        let mut treatments = BTreeMap::new();
        let mut outcomes = BTreeMap::new();
        let mut levels = Vec::new();
        let mut recovered = 0;
        let mut denominator = 0;

        for record in records {
            let filled = [
                ("meth_level", record.meth_level().is_some()),
                ("trigger", record.trigger().is_some()),
                ("treatment", record.treatment().is_some()),
                ("age", record.age().is_some()),
                ("gender", record.gender().is_some()),
                ("symptoms", record.symptoms().is_some()),
                ("outcome", record.outcome().is_some()),
                ("g6pd_status", record.g6pd_status().is_some()),
                ("mb_dose", record.mb_dose().is_some()),
            ];
            for (column, present) in filled {
                *coverage.entry(column.to_string()).or_default() += usize::from(present);
            }

            if let Some(level) = record.meth_level() {
                levels.push(level);
                *severity.entry(Severity::from_meth_level(level)).or_insert(0) += 1;
            }
            if let Some(trigger) = record.trigger() {
                *triggers.entry(trigger.to_string()).or_insert(0) += 1;
            }
            if let Some(treatment) = record.treatment() {
                *treatments.entry(treatment.to_string()).or_insert(0) += 1;
            }
            if let Some(outcome) = record.outcome() {
                *outcomes.entry(outcome).or_insert(0) += 1;

                if record.treated_with(methylene_blue_label) && outcome.is_resolved() {
                    denominator += 1;
                    if outcome == Outcome::Recovered {
                        recovered += 1;
                    }
                }
            }
        }

        let mean_quality_score = (!records.is_empty()).then(|| {
            records.iter().map(StructuredRecord::data_quality_score).sum::<f64>() / records.len() as f64
        });

        Self {
            total_records: records.len(),
            coverage,
            meth_level: MethLevelStats::from_values(levels),
            severity,
            triggers,
            treatments,
            outcomes,
            methylene_blue_recovery: RecoveryRate {
                recovered,
                denominator,
                rate: (denominator > 0).then(|| recovered as f64 / denominator as f64),
            },
            mean_quality_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;

    fn record(meth: Option<f64>, treatment: Option<&str>, outcome: Option<Outcome>) -> StructuredRecord {
        StructuredRecord::new(
            "x",
            RecordFields {
                meth_level: meth,
                treatment: treatment.map(String::from),
                outcome,
                ..Default::default()
            },
            0.5,
        )
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_meth_level(14.9), Severity::Mild);
        assert_eq!(Severity::from_meth_level(15.0), Severity::Moderate);
        assert_eq!(Severity::from_meth_level(30.0), Severity::Severe);
    }

    #[test]
    fn test_recovery_rate_denominator_excludes_unknown_and_untreated() {
        let records = vec![
            record(Some(40.0), Some("Methylene Blue"), Some(Outcome::Recovered)),
            record(Some(20.0), Some("Methylene Blue"), Some(Outcome::Fatal)),
            record(Some(10.0), Some("Methylene Blue"), Some(Outcome::Unknown)),
            record(None, Some("Methylene Blue"), None),
            record(Some(60.0), Some("Vitamin C"), Some(Outcome::Recovered)),
        ];
        let summary = BatchSummary::from_records(&records, "Methylene Blue");
        assert_eq!(summary.methylene_blue_recovery.recovered, 1);
        assert_eq!(summary.methylene_blue_recovery.denominator, 2);
        assert_eq!(summary.methylene_blue_recovery.rate, Some(0.5));
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.coverage["meth_level"], 4);
    }

    #[test]
    fn test_meth_stats() {
        let records = vec![
            record(Some(10.0), None, None),
            record(Some(20.0), None, None),
            record(Some(40.0), None, None),
            record(Some(50.0), None, None),
        ];
        let stats = BatchSummary::from_records(&records, "Methylene Blue").meth_level.unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!((stats.min, stats.max), (10.0, 50.0));
    }

    #[test]
    fn test_empty_batch() {
        let summary = BatchSummary::from_records(&[], "Methylene Blue");
        assert_eq!(summary.total_records, 0);
        assert!(summary.meth_level.is_none());
        assert!(summary.methylene_blue_recovery.rate.is_none());
        assert!(summary.mean_quality_score.is_none());
    }
}
