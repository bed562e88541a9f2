//! Data quality score: fraction of informative fields that were filled.

use methex_common::{FieldType, QualityConfig};

use crate::record::RecordFields;

pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Score in [0, 1]. `mb_dose` joins the denominator only when the
    /// treatment is methylene blue; an `Unknown` outcome counts as missing.
    pub fn score(&self, fields: &RecordFields) -> f64 {
        let mut total = 0usize;
        let mut present = 0usize;

        let mut count = |filled: bool| {
            total += 1;
            if filled {
                present += 1;
            }
        };

        for field in &self.config.informative_fields {
            if *field == FieldType::MbDose {
                continue;
            }
            count(is_filled(fields, *field));
        }

        if self.config.count_symptoms {
            count(fields.symptoms.is_some());
        }

        let methylene_blue = fields
            .treatment
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case(&self.config.methylene_blue_label));
        if methylene_blue {
            count(fields.mb_dose.is_some());
        }

        if total == 0 {
            0.0
        } else {
            present as f64 / total as f64
        }
    }
}

fn is_filled(fields: &RecordFields, field: FieldType) -> bool {
    match field {
        FieldType::MethLevel  => fields.meth_level.is_some(),
        FieldType::Trigger    => fields.trigger.is_some(),
        FieldType::Treatment  => fields.treatment.is_some(),
        FieldType::Age        => fields.age.is_some(),
        FieldType::Gender     => fields.gender.is_some(),
        FieldType::Outcome    => fields.outcome.is_some_and(|o| o.is_resolved()),
        FieldType::G6pdStatus => fields.g6pd_status.is_some(),
        FieldType::MbDose     => fields.mb_dose.is_some(),
    }
}
