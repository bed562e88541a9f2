//! Context scoring.
//!
//! context_score = w_section × section_priority
//!               + w_causal  × causal_proximity
//!               + w_spec    × pattern_specificity
//!
//! clamped to [0, 1]. Weights come from [`ScoringConfig`], optionally per field.

use methex_common::{FieldType, ScoringConfig, ScoringWeights, SectionLabel};

use crate::candidate::{Candidate, ContextFeatures, Mention, ScoredCandidate};
use crate::scanner::CausalSpan;
use crate::tokens::TokenIndex;

/// Pure weighted sum of the three signals.
pub fn compute_context_score(features: &ContextFeatures, weights: &ScoringWeights) -> f64 {
    let weighted_sum: f64 = features
        .as_array()
        .iter()
        .zip(weights.as_array().iter())
        .map(|(f, w)| f * w)
        .sum();

    weighted_sum.clamp(0.0, 1.0)
}

/// Proximity signal for a token gap to the nearest causal phrase.
///
/// gap 0 (adjacent) scores 1.0 and decays linearly to just above `baseline`
/// at `window`; no phrase or a phrase beyond the window scores `baseline`.
pub fn causal_proximity(gap: Option<usize>, window: usize, baseline: f64) -> f64 {
    match gap {
        Some(g) if g <= window => {
            let decay = 1.0 - g as f64 / (window + 1) as f64;
            baseline + (1.0 - baseline) * decay
        }
        _ => baseline,
    }
}

/// Per-document data the scorer needs beyond the candidate itself.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    pub tokens: TokenIndex,
    pub causal: Vec<CausalSpan>,
}

impl DocumentContext {
    pub fn new(text: &str, causal: Vec<CausalSpan>) -> Self {
        Self { tokens: TokenIndex::new(text), causal }
    }

    /// Token gap between `[start, end)` and the nearest causal phrase in the
    /// same section and clause. Phrases overlapping the span are ignored.
    pub fn causal_gap(&self, section_index: usize, start: usize, end: usize) -> Option<usize> {
        let (first, last) = self.tokens.span(start, end)?;

        self.causal
            .iter()
            .filter(|p| p.section_index == section_index)
            .filter(|p| p.end <= start || p.start >= end)
            .filter_map(|p| {
                let (p_first, p_last) = self.tokens.span(p.start, p.end)?;
                if p_last < first {
                    self.tokens.same_clause(p_last, first).then(|| first - p_last - 1)
                } else if p_first > last {
                    self.tokens.same_clause(last, p_first).then(|| p_first - last - 1)
                } else {
                    None
                }
            })
            .min()
    }
}

pub struct ContextScorer {
    config: ScoringConfig,
}

impl ContextScorer {
    /// `config` weights are expected to be normalised already.
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn features(
        &self,
        context: &DocumentContext,
        section_label: SectionLabel,
        section_index: usize,
        span: (usize, usize),
        specificity: f64,
    ) -> ContextFeatures {
        let gap = context.causal_gap(section_index, span.0, span.1);
        ContextFeatures {
            section_priority: self.config.section_priority.get(section_label),
            causal_proximity: causal_proximity(
                gap,
                self.config.causal_window_tokens,
                self.config.causal_baseline,
            ),
            pattern_specificity: specificity.clamp(0.0, 1.0),
        }
    }

    pub fn score(&self, context: &DocumentContext, candidate: Candidate) -> ScoredCandidate {
        let features = self.features(
            context,
            candidate.section_label,
            candidate.section_index,
            (candidate.offset, candidate.end_offset),
            candidate.pattern_specificity,
        );
        let weights = self.config.weights_for(candidate.field_type);
        ScoredCandidate {
            context_score: compute_context_score(&features, weights),
            features,
            candidate,
        }
    }

    pub fn score_all(&self, context: &DocumentContext, candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
        candidates.into_iter().map(|c| self.score(context, c)).collect()
    }

    /// Auxiliary mentions use the default weight vector.
    pub fn score_mention(&self, context: &DocumentContext, mention: &Mention) -> f64 {
        let features = self.features(
            context,
            mention.section_label,
            mention.section_index,
            (mention.offset, mention.end_offset),
            mention.specificity,
        );
        compute_context_score(&features, &self.config.weights)
    }

    pub fn weights_for(&self, field: FieldType) -> &ScoringWeights {
        self.config.weights_for(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamped() {
        let features = ContextFeatures {
            section_priority: 1.0,
            causal_proximity: 1.0,
            pattern_specificity: 1.0,
        };
        let heavy = ScoringWeights {
            section_priority: 2.0,
            causal_proximity: 2.0,
            pattern_specificity: 2.0,
        };
        assert_eq!(compute_context_score(&features, &heavy), 1.0);
        assert!((compute_context_score(&features, &ScoringWeights::default()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_section_priority_monotone() {
        let weights = ScoringWeights::default();
        let priorities = methex_common::SectionPriorities::default();
        let score = |label| {
            compute_context_score(
                &ContextFeatures {
                    section_priority: priorities.get(label),
                    causal_proximity: 0.2,
                    pattern_specificity: 0.8,
                },
                &weights,
            )
        };
        assert!(score(SectionLabel::CasePresentation) > score(SectionLabel::Discussion));
        assert!(score(SectionLabel::Discussion) > score(SectionLabel::Other));
        assert!(score(SectionLabel::Other) > score(SectionLabel::Background));
    }

    #[test]
    fn test_causal_proximity_decays() {
        let near = causal_proximity(Some(0), 8, 0.2);
        let mid = causal_proximity(Some(4), 8, 0.2);
        let far = causal_proximity(Some(8), 8, 0.2);
        assert!((near - 1.0).abs() < 1e-12);
        assert!(near > mid && mid > far && far > 0.2);
        assert_eq!(causal_proximity(Some(9), 8, 0.2), 0.2);
        assert_eq!(causal_proximity(None, 8, 0.2), 0.2);
    }

    #[test]
    fn test_causal_gap_respects_clause() {
        let text = "cyanosis after benzocaine. Dapsone was continued";
        let start = text.find("after").unwrap();
        let context = DocumentContext::new(
            text,
            vec![CausalSpan { start, end: start + 5, section_index: 0 }],
        );
        let b = text.find("benzocaine").unwrap();
        let d = text.find("Dapsone").unwrap();
        assert_eq!(context.causal_gap(0, b, b + 10), Some(0));
        assert_eq!(context.causal_gap(0, d, d + 7), None);
        assert_eq!(context.causal_gap(1, b, b + 10), None);
    }

    #[test]
    fn test_reverse_direction_counts() {
        let text = "dapsone induced methemoglobinemia";
        let start = text.find("induced").unwrap();
        let context = DocumentContext::new(
            text,
            vec![CausalSpan { start, end: start + 7, section_index: 0 }],
        );
        assert_eq!(context.causal_gap(0, 0, 7), Some(0));
    }
}
