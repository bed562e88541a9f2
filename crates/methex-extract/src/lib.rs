//! Case-report extraction pipeline.
//!
//! Turns free-text methemoglobinemia case reports into one
//! [`StructuredRecord`] per document:
//!
//! raw text → [`SectionSegmenter`] → [`CandidateScanner`] → [`ContextScorer`]
//! → [`FieldResolver`] → [`RecordAssembler`] → [`QualityScorer`]
//!
//! Per-document work is pure and lock-free; batches fan out over rayon with
//! the default `parallel` feature.

pub mod assembler;
pub mod candidate;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod quality;
pub mod record;
pub mod resolver;
pub mod scanner;
pub mod scorer;
pub mod segmenter;
pub mod summary;
pub mod tokens;
pub mod validation;

pub use assembler::RecordAssembler;
pub use candidate::{Candidate, ContextFeatures, FieldValue, ScoredCandidate};
pub use document::Document;
pub use error::{ExtractError, Result};
pub use pipeline::{Extraction, ExtractionPipeline, FieldEvidence};
pub use quality::QualityScorer;
pub use record::{G6pdStatus, Gender, Outcome, RecordFields, StructuredRecord};
pub use resolver::FieldResolver;
pub use scanner::CandidateScanner;
pub use scorer::{compute_context_score, ContextScorer};
pub use segmenter::{Section, SectionSegmenter};
pub use summary::{BatchSummary, Severity};
pub use validation::{IssueKind, RecordValidator, ValidationIssue};
