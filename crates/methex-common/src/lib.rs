//! methex-common: shared field types, errors, and configuration used across all methex crates.

pub mod error;
pub mod fields;
pub mod config;

// Re-export commonly used types
pub use config::{
    BoundsConfig, ExtractionConfig, NumericBounds, QualityConfig, ScoringConfig, ScoringWeights,
    SectionPriorities, SegmenterConfig, ValidationConfig, AGE_RANGE, METH_LEVEL_RANGE,
};
pub use error::{MethexError, Result};
pub use fields::{FieldType, SectionLabel};
