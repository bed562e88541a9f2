//! End-to-end extraction: segment, scan, score, resolve, assemble.
//!
//! Construction validates configuration and lexicon and is the only fallible
//! step. Processing a document always yields exactly one record.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use methex_common::{ExtractionConfig, FieldType, SectionLabel};
use methex_lexicon::LexiconStore;

use crate::assembler::RecordAssembler;
use crate::candidate::{FieldValue, Mention};
use crate::document::Document;
use crate::error::Result;
use crate::quality::QualityScorer;
use crate::record::StructuredRecord;
use crate::resolver::{select_best, FieldResolver, ResolvedFields};
use crate::scanner::CandidateScanner;
use crate::scorer::{ContextScorer, DocumentContext};
use crate::segmenter::{Section, SectionSegmenter};
use crate::validation::{RecordValidator, ValidationIssue};

/// Why a field got its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEvidence {
    pub raw_value: String,
    pub value: FieldValue,
    pub context_score: f64,
    pub section: SectionLabel,
    pub offset: usize,
    /// Candidates that competed for the field
    pub candidate_count: usize,
}

/// A record plus everything learned along the way that is not part of the
/// persisted schema.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub record: StructuredRecord,
    pub sections: Vec<SectionSummary>,
    pub evidence: BTreeMap<FieldType, FieldEvidence>,
    pub exposure_route: Option<String>,
    pub time_to_improvement_minutes: Option<f64>,
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub label: SectionLabel,
    pub start_offset: usize,
    pub end_offset: usize,
}

impl From<&Section> for SectionSummary {
    fn from(section: &Section) -> Self {
        Self {
            label: section.label,
            start_offset: section.start_offset,
            end_offset: section.end_offset,
        }
    }
}

pub struct ExtractionPipeline {
    segmenter: SectionSegmenter,
    scanner: CandidateScanner,
    scorer: ContextScorer,
    resolver: FieldResolver,
    assembler: RecordAssembler,
    validator: RecordValidator,
}

impl ExtractionPipeline {
    /// Build from an explicit configuration and lexicon.
    pub fn new(config: ExtractionConfig, lexicon: LexiconStore) -> Result<Self> {
        config.validate()?;
        lexicon.validate()?;

        let mut scoring = config.scoring;
        scoring.normalise();

        let scanner = CandidateScanner::new(&lexicon, config.bounds.clone())?;
        let segmenter = SectionSegmenter::new(&lexicon.headings, &config.segmenter);

        info!(
            "ExtractionPipeline ready: {} rules, {} headings, causal window {} tokens",
            scanner.rule_count(),
            segmenter.heading_count(),
            scoring.causal_window_tokens
        );

        Ok(Self {
            segmenter,
            scanner,
            scorer: ContextScorer::new(scoring),
            resolver: FieldResolver::new(config.bounds),
            validator: RecordValidator::new(config.validation, config.quality.methylene_blue_label.clone()),
            assembler: RecordAssembler::new(QualityScorer::new(config.quality)),
        })
    }

    /// Build from configuration, loading the lexicon from `lexicon_path` when
    /// set and using the embedded lexicon otherwise.
    pub fn from_config(config: ExtractionConfig) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => LexiconStore::from_path(path)?,
            None => LexiconStore::embedded(),
        };
        Self::new(config, lexicon)
    }

    /// Default configuration with the embedded lexicon.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ExtractionConfig::default(), LexiconStore::embedded())
    }

    pub fn process(&self, document: &Document) -> StructuredRecord {
        self.process_detailed(document).record
    }

    pub fn process_detailed(&self, document: &Document) -> Extraction {
        let text = document.raw_text.as_str();
        let sections = self.segmenter.segment(text);
        let scan = self.scanner.scan(&sections);

        let context = DocumentContext::new(text, scan.causal);
        let scored = self.scorer.score_all(&context, scan.candidates);
        let resolved = self.resolver.resolve_all(scored);

        let symptoms = join_symptoms(&scan.symptoms);
        let exposure_route = self
            .best_mention(&context, &scan.routes)
            .and_then(|m| m.value.as_label().map(str::to_string));
        let time_to_improvement_minutes = self
            .best_mention(&context, &scan.times)
            .and_then(|m| m.value.as_number());

        let record = self.assembler.assemble(&document.id, &resolved, symptoms);
        let issues = self.validator.validate(&record);
        for issue in &issues {
            debug!(pmid = %document.id, kind = ?issue.kind, "{}", issue.message);
        }

        Extraction {
            evidence: evidence(&resolved),
            sections: sections.iter().map(SectionSummary::from).collect(),
            record,
            exposure_route,
            time_to_improvement_minutes,
            issues,
        }
    }

    /// Records in input order. Runs on the rayon pool with the `parallel`
    /// feature.
    pub fn process_batch(&self, documents: &[Document]) -> Vec<StructuredRecord> {
        #[cfg(feature = "parallel")]
        let iter = documents.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = documents.iter();

        iter.map(|d| self.process(d)).collect()
    }

    pub fn process_batch_detailed(&self, documents: &[Document]) -> Vec<Extraction> {
        #[cfg(feature = "parallel")]
        let iter = documents.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = documents.iter();

        iter.map(|d| self.process_detailed(d)).collect()
    }

    fn best_mention<'a>(&self, context: &DocumentContext, mentions: &'a [Mention]) -> Option<&'a Mention> {
        select_best(mentions.iter(), |m| {
            (self.scorer.score_mention(context, m), m.section_label, m.offset)
        })
    }
}

/// Symptom labels outside background sections, first mention first.
fn join_symptoms(mentions: &[Mention]) -> Option<String> {
    let mut labels: Vec<&str> = Vec::new();
    for mention in mentions {
        if mention.section_label == SectionLabel::Background {
            continue;
        }
        if let Some(label) = mention.value.as_label() {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    (!labels.is_empty()).then(|| labels.join(", "))
}

fn evidence(resolved: &ResolvedFields) -> BTreeMap<FieldType, FieldEvidence> {
    resolved
        .iter()
        .map(|(field, winner)| {
            let c = &winner.candidate;
            (
                *field,
                FieldEvidence {
                    raw_value: c.raw_value.clone(),
                    value: c.normalized_value.clone(),
                    context_score: winner.context_score,
                    section: c.section_label,
                    offset: c.offset,
                    candidate_count: resolved.candidate_count(*field),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> ExtractionPipeline {
        ExtractionPipeline::with_defaults().unwrap()
    }

    #[test]
    fn test_symptoms_skip_background_and_dedupe() {
        let text = "Introduction\nHeadache is common.\nCase Report\nShe had cyanosis, dyspnea and cyanotic lips.";
        let record = pipeline().process(&Document::new("1", text));
        assert_eq!(record.symptoms(), Some("Cyanosis, Dyspnea"));
    }

    #[test]
    fn test_exposure_route_and_time() {
        let text = "After ingestion of dapsone she became cyanotic. Methylene blue 1 mg/kg was given intravenously and cyanosis resolved within 30 minutes.";
        let extraction = pipeline().process_detailed(&Document::new("2", text));
        assert_eq!(extraction.time_to_improvement_minutes, Some(30.0));
        assert!(extraction.exposure_route.is_some());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut config = ExtractionConfig::default();
        config.scoring.causal_baseline = 2.0;
        assert!(ExtractionPipeline::new(config, LexiconStore::embedded()).is_err());
    }

    #[test]
    fn test_sections_reported() {
        let extraction = pipeline().process_detailed(&Document::new("3", "Case Report\nText.\nDiscussion\nMore."));
        let labels: Vec<_> = extraction.sections.iter().map(|s| s.label).collect();
        assert_eq!(labels, vec![SectionLabel::CasePresentation, SectionLabel::Discussion]);
    }
}
