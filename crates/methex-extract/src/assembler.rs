//! Record Assembler: merges resolved fields into a [`StructuredRecord`].

use tracing::debug;

use methex_common::FieldType;

use crate::quality::QualityScorer;
use crate::record::{G6pdStatus, Gender, Outcome, RecordFields, StructuredRecord};
use crate::resolver::ResolvedFields;

pub struct RecordAssembler {
    quality: QualityScorer,
}

impl RecordAssembler {
    pub fn new(quality: QualityScorer) -> Self {
        Self { quality }
    }

    /// Map resolved values onto record fields. A label outside the closed
    /// set of an enum field leaves that field empty.
    pub fn merge(resolved: &ResolvedFields, symptoms: Option<String>) -> RecordFields {
        RecordFields {
            meth_level: resolved.number(FieldType::MethLevel),
            trigger: resolved.label(FieldType::Trigger).map(str::to_string),
            treatment: resolved.label(FieldType::Treatment).map(str::to_string),
            age: resolved
                .number(FieldType::Age)
                .filter(|a| *a >= 0.0 && *a <= u32::MAX as f64)
                .map(|a| a as u32),
            gender: closed_label(resolved, FieldType::Gender, Gender::from_label),
            symptoms,
            outcome: closed_label(resolved, FieldType::Outcome, Outcome::from_label),
            g6pd_status: closed_label(resolved, FieldType::G6pdStatus, G6pdStatus::from_label),
            mb_dose: resolved.number(FieldType::MbDose),
        }
    }

    pub fn assemble(&self, pmid: &str, resolved: &ResolvedFields, symptoms: Option<String>) -> StructuredRecord {
        let fields = Self::merge(resolved, symptoms);
        let score = self.quality.score(&fields);
        StructuredRecord::new(pmid, fields, score)
    }
}

fn closed_label<T>(resolved: &ResolvedFields, field: FieldType, parse: fn(&str) -> Option<T>) -> Option<T> {
    let label = resolved.label(field)?;
    let parsed = parse(label);
    if parsed.is_none() {
        debug!(%field, label, "label outside closed set, leaving field empty");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use methex_common::QualityConfig;

    #[test]
    fn test_all_null_record_still_produced() {
        let assembler = RecordAssembler::new(QualityScorer::new(QualityConfig::default()));
        let record = assembler.assemble("PMID1", &ResolvedFields::default(), None);
        assert_eq!(record.pmid(), "PMID1");
        assert!(record.meth_level().is_none());
        assert!(record.outcome().is_none());
        assert_eq!(record.data_quality_score(), 0.0);
    }
}
