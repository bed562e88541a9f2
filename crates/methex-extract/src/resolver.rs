//! Field resolution: one winner (or none) per field.

use std::collections::BTreeMap;
use tracing::debug;

use methex_common::{BoundsConfig, FieldType, SectionLabel};

use crate::candidate::{FieldValue, ScoredCandidate};

/// Scores closer than this are treated as tied.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Pick the best item by score; ties go to the higher-ranked section, then
/// the earliest offset.
pub fn select_best<T>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> (f64, SectionLabel, usize),
) -> Option<T> {
    let mut best: Option<(T, (f64, SectionLabel, usize))> = None;

    for item in items {
        let k = key(&item);
        let better = match &best {
            None => true,
            Some((_, b)) => {
                if (k.0 - b.0).abs() > SCORE_EPSILON {
                    k.0 > b.0
                } else if k.1.rank() != b.1.rank() {
                    k.1.rank() > b.1.rank()
                } else {
                    k.2 < b.2
                }
            }
        };
        if better {
            best = Some((item, k));
        }
    }

    best.map(|(item, _)| item)
}

/// Winning candidate per field, plus how many candidates competed.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFields {
    winners: BTreeMap<FieldType, ScoredCandidate>,
    candidate_counts: BTreeMap<FieldType, usize>,
}

impl ResolvedFields {
    pub fn value(&self, field: FieldType) -> Option<&FieldValue> {
        self.winners.get(&field).map(|w| &w.candidate.normalized_value)
    }

    pub fn number(&self, field: FieldType) -> Option<f64> {
        self.value(field).and_then(FieldValue::as_number)
    }

    pub fn label(&self, field: FieldType) -> Option<&str> {
        self.value(field).and_then(FieldValue::as_label)
    }

    pub fn winner(&self, field: FieldType) -> Option<&ScoredCandidate> {
        self.winners.get(&field)
    }

    pub fn candidate_count(&self, field: FieldType) -> usize {
        self.candidate_counts.get(&field).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldType, &ScoredCandidate)> {
        self.winners.iter()
    }
}

pub struct FieldResolver {
    bounds: BoundsConfig,
}

impl FieldResolver {
    pub fn new(bounds: BoundsConfig) -> Self {
        Self { bounds }
    }

    /// Winner among `candidates` for `field`. Out-of-range candidates are
    /// discarded first, so the next-best in-range candidate wins; values are
    /// never clamped.
    pub fn resolve<'a>(&self, field: FieldType, candidates: &'a [ScoredCandidate]) -> Option<&'a ScoredCandidate> {
        let bounds = self.bounds.for_field(field);
        let in_range = candidates
            .iter()
            .filter(|c| c.candidate.field_type == field)
            .filter(|c| match (bounds, c.candidate.normalized_value.as_number()) {
                (Some(b), Some(value)) if !b.contains(value) => {
                    debug!(%field, value, "discarding out-of-range candidate");
                    false
                }
                _ => true,
            });

        select_best(in_range, |c| (c.context_score, c.candidate.section_label, c.candidate.offset))
    }

    pub fn resolve_all(&self, candidates: Vec<ScoredCandidate>) -> ResolvedFields {
        let mut resolved = ResolvedFields::default();

        for field in FieldType::ALL {
            let count = candidates.iter().filter(|c| c.candidate.field_type == field).count();
            if count == 0 {
                continue;
            }
            resolved.candidate_counts.insert(field, count);
            if let Some(winner) = self.resolve(field, &candidates) {
                resolved.winners.insert(field, winner.clone());
            }
        }

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{Candidate, ContextFeatures};
    use methex_common::NumericBounds;

    fn scored(field: FieldType, value: FieldValue, label: SectionLabel, offset: usize, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: Candidate {
                field_type: field,
                raw_value: value.to_string(),
                normalized_value: value,
                section_label: label,
                section_index: 0,
                offset,
                end_offset: offset + 1,
                pattern_specificity: 1.0,
            },
            features: ContextFeatures {
                section_priority: 0.0,
                causal_proximity: 0.0,
                pattern_specificity: 1.0,
            },
            context_score: score,
        }
    }

    fn label(s: &str) -> FieldValue {
        FieldValue::Label(s.to_string())
    }

    #[test]
    fn test_highest_score_wins() {
        let resolver = FieldResolver::new(BoundsConfig::default());
        let candidates = vec![
            scored(FieldType::Trigger, label("Dapsone"), SectionLabel::CasePresentation, 0, 0.5),
            scored(FieldType::Trigger, label("Benzocaine"), SectionLabel::Background, 10, 0.7),
        ];
        let winner = resolver.resolve(FieldType::Trigger, &candidates).unwrap();
        assert_eq!(winner.candidate.normalized_value, label("Benzocaine"));
    }

    #[test]
    fn test_tie_prefers_section_then_offset() {
        let resolver = FieldResolver::new(BoundsConfig::default());
        let candidates = vec![
            scored(FieldType::Trigger, label("Dapsone"), SectionLabel::Discussion, 0, 0.6),
            scored(FieldType::Trigger, label("Benzocaine"), SectionLabel::CasePresentation, 50, 0.6),
            scored(FieldType::Trigger, label("Lidocaine"), SectionLabel::CasePresentation, 20, 0.6),
        ];
        let winner = resolver.resolve(FieldType::Trigger, &candidates).unwrap();
        assert_eq!(winner.candidate.normalized_value, label("Lidocaine"));
    }

    #[test]
    fn test_out_of_range_candidate_falls_back_to_next_best() {
        let resolver = FieldResolver::new(BoundsConfig::default());
        let candidates = vec![
            scored(FieldType::Age, FieldValue::Number(130.0), SectionLabel::CasePresentation, 0, 0.9),
            scored(FieldType::Age, FieldValue::Number(40.0), SectionLabel::CasePresentation, 10, 0.5),
        ];
        let winner = resolver.resolve(FieldType::Age, &candidates).unwrap();
        assert_eq!(winner.candidate.normalized_value, FieldValue::Number(40.0));
    }

    #[test]
    fn test_only_out_of_range_candidates_is_null_not_clamped() {
        let mut bounds = BoundsConfig::default();
        bounds.meth_level = NumericBounds::new(0.0, 100.0);
        let resolver = FieldResolver::new(bounds);
        let candidates = vec![
            scored(FieldType::MethLevel, FieldValue::Number(150.0), SectionLabel::CasePresentation, 0, 0.9),
        ];
        assert!(resolver.resolve(FieldType::MethLevel, &candidates).is_none());
        let resolved = resolver.resolve_all(candidates);
        assert!(resolved.value(FieldType::MethLevel).is_none());
        assert_eq!(resolved.candidate_count(FieldType::MethLevel), 1);
    }

    #[test]
    fn test_no_candidates_is_null() {
        let resolver = FieldResolver::new(BoundsConfig::default());
        let resolved = resolver.resolve_all(Vec::new());
        for field in FieldType::ALL {
            assert!(resolved.value(field).is_none());
            assert_eq!(resolved.candidate_count(field), 0);
        }
    }
}
