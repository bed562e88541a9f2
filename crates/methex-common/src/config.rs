//! Extraction configuration.
//!
//! Scoring weights, plausibility bounds, quality and validation thresholds are
//! all configuration, loaded from TOML/YAML/JSON. Every field has a default so
//! a partial file (or no file at all) yields a working pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::error::{MethexError, Result};
use crate::fields::{FieldType, SectionLabel};

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Context scoring weights and signal parameters
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Clinically plausible ranges for numeric fields
    #[serde(default)]
    pub bounds: BoundsConfig,

    /// Heading detection
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// Data quality scoring
    #[serde(default)]
    pub quality: QualityConfig,

    /// Advisory record validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Optional YAML/JSON lexicon replacing the embedded one
    #[serde(default)]
    pub lexicon_path: Option<String>,
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// The 3-component weight vector for context scoring.
/// Weights sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Section the candidate was found in
    #[serde(default = "default_section_weight")]
    pub section_priority: f64,
    /// Token distance to the nearest causal-relation phrase
    #[serde(default = "default_causal_weight")]
    pub causal_proximity: f64,
    /// Specificity of the rule that produced the candidate
    #[serde(default = "default_specificity_weight")]
    pub pattern_specificity: f64,
}

fn default_section_weight() -> f64     { 0.40 }
fn default_causal_weight() -> f64      { 0.35 }
fn default_specificity_weight() -> f64 { 0.25 }

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            section_priority:    default_section_weight(),
            causal_proximity:    default_causal_weight(),
            pattern_specificity: default_specificity_weight(),
        }
    }
}

impl ScoringWeights {
    /// Weights for fields where causal phrasing carries no signal
    /// (measurements, demographics, status labels).
    pub fn without_causal() -> Self {
        Self {
            section_priority:    0.60,
            causal_proximity:    0.0,
            pattern_specificity: 0.40,
        }
    }

    /// Validate that all weights sum to ~1.0
    pub fn validate(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum = self.sum();
        if sum > 0.0 {
            self.section_priority    /= sum;
            self.causal_proximity    /= sum;
            self.pattern_specificity /= sum;
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.section_priority, self.causal_proximity, self.pattern_specificity]
    }

    fn sum(&self) -> f64 {
        self.section_priority + self.causal_proximity + self.pattern_specificity
    }
}

/// Normalised priority of each section label, in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPriorities {
    #[serde(default = "default_case_priority")]
    pub case_presentation: f64,
    #[serde(default = "default_discussion_priority")]
    pub discussion: f64,
    #[serde(default = "default_other_priority")]
    pub other: f64,
    #[serde(default = "default_background_priority")]
    pub background: f64,
}

fn default_case_priority() -> f64       { 1.0 }
fn default_discussion_priority() -> f64 { 0.7 }
fn default_other_priority() -> f64      { 0.5 }
fn default_background_priority() -> f64 { 0.2 }

impl Default for SectionPriorities {
    fn default() -> Self {
        Self {
            case_presentation: default_case_priority(),
            discussion:        default_discussion_priority(),
            other:             default_other_priority(),
            background:        default_background_priority(),
        }
    }
}

impl SectionPriorities {
    pub fn get(&self, label: SectionLabel) -> f64 {
        match label {
            SectionLabel::CasePresentation => self.case_presentation,
            SectionLabel::Discussion       => self.discussion,
            SectionLabel::Other            => self.other,
            SectionLabel::Background       => self.background,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Default weight vector
    #[serde(default)]
    pub weights: ScoringWeights,

    /// Per-field weight vectors replacing the default
    #[serde(default = "default_field_weights")]
    pub field_weights: BTreeMap<FieldType, ScoringWeights>,

    #[serde(default)]
    pub section_priority: SectionPriorities,

    /// Causal phrases further than this many tokens away fall back to the baseline
    #[serde(default = "default_causal_window")]
    pub causal_window_tokens: usize,

    /// Proximity signal for candidates with no causal phrase in range
    #[serde(default = "default_causal_baseline")]
    pub causal_baseline: f64,
}

fn default_field_weights() -> BTreeMap<FieldType, ScoringWeights> {
    [
        FieldType::MethLevel,
        FieldType::Age,
        FieldType::Gender,
        FieldType::Outcome,
        FieldType::G6pdStatus,
        FieldType::MbDose,
    ]
    .into_iter()
    .map(|field| (field, ScoringWeights::without_causal()))
    .collect()
}

fn default_causal_window() -> usize { 8 }
fn default_causal_baseline() -> f64 { 0.2 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights:              ScoringWeights::default(),
            field_weights:        default_field_weights(),
            section_priority:     SectionPriorities::default(),
            causal_window_tokens: default_causal_window(),
            causal_baseline:      default_causal_baseline(),
        }
    }
}

impl ScoringConfig {
    /// Weight vector in effect for a field.
    pub fn weights_for(&self, field: FieldType) -> &ScoringWeights {
        self.field_weights.get(&field).unwrap_or(&self.weights)
    }

    /// Renormalise every weight vector so each sums to 1.0
    pub fn normalise(&mut self) {
        self.weights.normalise();
        for weights in self.field_weights.values_mut() {
            weights.normalise();
        }
    }
}

// ── Bounds ───────────────────────────────────────────────────────────────────

/// Inclusive plausibility range for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericBounds {
    pub min: f64,
    pub max: f64,
}

impl NumericBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsConfig {
    /// Methemoglobin percentage
    #[serde(default = "default_meth_bounds")]
    pub meth_level: NumericBounds,
    /// Age in whole years
    #[serde(default = "default_age_bounds")]
    pub age: NumericBounds,
    /// Methylene blue dose in mg/kg
    #[serde(default = "default_mb_dose_bounds")]
    pub mb_dose: NumericBounds,
}

/// MetHb is a percentage of total hemoglobin.
pub const METH_LEVEL_RANGE: NumericBounds = NumericBounds { min: 0.0, max: 100.0 };
/// Ages are whole years.
pub const AGE_RANGE: NumericBounds = NumericBounds { min: 0.0, max: 120.0 };

fn default_meth_bounds() -> NumericBounds    { METH_LEVEL_RANGE }
fn default_age_bounds() -> NumericBounds     { AGE_RANGE }
fn default_mb_dose_bounds() -> NumericBounds { NumericBounds::new(0.0, 10.0) }

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            meth_level: default_meth_bounds(),
            age:        default_age_bounds(),
            mb_dose:    default_mb_dose_bounds(),
        }
    }
}

impl BoundsConfig {
    /// Bounds for a numeric field; `None` for label fields.
    pub fn for_field(&self, field: FieldType) -> Option<NumericBounds> {
        match field {
            FieldType::MethLevel => Some(self.meth_level),
            FieldType::Age       => Some(self.age),
            FieldType::MbDose    => Some(self.mb_dose),
            _ => None,
        }
    }
}

// ── Segmenter ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Lines longer than this are never treated as standalone headings
    #[serde(default = "default_max_heading_chars")]
    pub max_heading_chars: usize,
}

fn default_max_heading_chars() -> usize { 60 }

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self { max_heading_chars: default_max_heading_chars() }
    }
}

// ── Quality ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Fields always counted in the denominator
    #[serde(default = "default_informative_fields")]
    pub informative_fields: Vec<FieldType>,

    /// Count the symptoms column as an informative field
    #[serde(default = "default_true")]
    pub count_symptoms: bool,

    /// mb_dose joins the denominator only when treatment carries this label
    #[serde(default = "default_mb_label")]
    pub methylene_blue_label: String,
}

fn default_true() -> bool { true }
fn default_mb_label() -> String { "Methylene Blue".to_string() }

fn default_informative_fields() -> Vec<FieldType> {
    vec![
        FieldType::MethLevel,
        FieldType::Trigger,
        FieldType::Treatment,
        FieldType::Age,
        FieldType::Gender,
        FieldType::Outcome,
        FieldType::G6pdStatus,
    ]
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            informative_fields:   default_informative_fields(),
            count_symptoms:       true,
            methylene_blue_label: default_mb_label(),
        }
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// MetHb above this is flagged for review (>70% is often fatal)
    #[serde(default = "default_high_meth")]
    pub high_meth_level: f64,

    /// MetHb below this is unusual for a published case
    #[serde(default = "default_low_meth")]
    pub low_meth_level: f64,

    /// Percentages that are often hour counts misread as MetHb
    #[serde(default = "default_time_values")]
    pub suspicious_time_values: Vec<f64>,

    /// Records scoring below this need manual review
    #[serde(default = "default_low_quality")]
    pub low_quality_score: f64,

    /// Trigger label used for congenital/hereditary cases
    #[serde(default = "default_genetic_label")]
    pub genetic_trigger_label: String,
}

fn default_high_meth() -> f64 { 70.0 }
fn default_low_meth() -> f64 { 10.0 }
fn default_time_values() -> Vec<f64> { vec![24.0, 48.0, 72.0, 96.0] }
fn default_low_quality() -> f64 { 0.5 }
fn default_genetic_label() -> String { "Genetic".to_string() }

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            high_meth_level:        default_high_meth(),
            low_meth_level:         default_low_meth(),
            suspicious_time_values: default_time_values(),
            low_quality_score:      default_low_quality(),
            genetic_trigger_label:  default_genetic_label(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl ExtractionConfig {
    /// Load configuration from methex.toml.
    /// Checks METHEX_CONFIG env var first, then current directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("METHEX_CONFIG")
            .unwrap_or_else(|_| "methex.toml".to_string());

        if !Path::new(&path).exists() {
            warn!("No config at {}, using defaults", path);
            return Ok(Self::default());
        }

        Self::from_path(&path)
    }

    /// Load from a file, choosing the format by extension (toml by default).
    pub fn from_path(path: &str) -> Result<Self> {
        let lower = path.to_lowercase();
        let config = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Self::from_yaml(path)?
        } else if lower.ends_with(".json") {
            Self::from_json(path)?
        } else {
            Self::from_toml(path)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from YAML file
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Check internal consistency. Weight vectors need not sum to 1.0 here;
    /// the pipeline renormalises them at construction.
    pub fn validate(&self) -> Result<()> {
        let scoring = &self.scoring;
        let vectors = std::iter::once((None, &scoring.weights))
            .chain(scoring.field_weights.iter().map(|(f, w)| (Some(*f), w)));
        for (field, weights) in vectors {
            let arr = weights.as_array();
            if arr.iter().any(|w| !w.is_finite() || *w < 0.0) || arr.iter().sum::<f64>() <= 0.0 {
                let name = field.map(|f| f.as_str()).unwrap_or("default");
                return Err(MethexError::Config(format!(
                    "scoring weights for {name} must be non-negative with a positive sum: {arr:?}"
                )));
            }
        }

        let p = &scoring.section_priority;
        let ordered = [p.case_presentation, p.discussion, p.other, p.background];
        if ordered.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(MethexError::Config(format!("section priorities must lie in [0, 1]: {ordered:?}")));
        }
        if ordered.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(MethexError::Config(
                "section priorities must satisfy case_presentation >= discussion >= other >= background".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&scoring.causal_baseline) {
            return Err(MethexError::Config(format!(
                "causal_baseline must lie in [0, 1], got {}", scoring.causal_baseline
            )));
        }

        for (name, b) in [("meth_level", self.bounds.meth_level), ("age", self.bounds.age), ("mb_dose", self.bounds.mb_dose)] {
            if !(b.min.is_finite() && b.max.is_finite()) || b.min > b.max {
                return Err(MethexError::Config(format!("invalid {name} bounds: [{}, {}]", b.min, b.max)));
            }
        }

        // Bounds may narrow the clinical ranges but never widen them
        for (name, b, limit) in [
            ("meth_level", self.bounds.meth_level, METH_LEVEL_RANGE),
            ("age", self.bounds.age, AGE_RANGE),
            ("mb_dose", self.bounds.mb_dose, NumericBounds::new(0.0, f64::MAX)),
        ] {
            if b.min < limit.min || b.max > limit.max {
                return Err(MethexError::Config(format!(
                    "{name} bounds [{}, {}] exceed the clinical range [{}, {}]",
                    b.min, b.max, limit.min, limit.max
                )));
            }
        }

        Ok(())
    }

    /// Save to TOML file
    pub fn to_toml(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MethexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = ScoringConfig::default();
        assert!(config.weights.validate(), "Default weights must sum to 1.0");
        for weights in config.field_weights.values() {
            assert!(weights.validate());
        }
    }

    #[test]
    fn test_normalise_restores_sum() {
        let mut w = ScoringWeights::default();
        w.causal_proximity += 0.5; // deliberately break sum
        assert!(!w.validate());
        w.normalise();
        assert!(w.validate());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_trigger_keeps_causal_weight() {
        let config = ScoringConfig::default();
        assert!(config.weights_for(FieldType::Trigger).causal_proximity > 0.0);
        assert_eq!(config.weights_for(FieldType::MethLevel).causal_proximity, 0.0);
    }

    #[test]
    fn test_rejects_inverted_section_priorities() {
        let mut config = ExtractionConfig::default();
        config.scoring.section_priority.background = 1.0;
        config.scoring.section_priority.case_presentation = 0.1;
        assert!(matches!(config.validate(), Err(MethexError::Config(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = ExtractionConfig::default();
        config.scoring.weights.causal_proximity = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = ExtractionConfig::default();
        config.bounds.age = NumericBounds::new(120.0, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bounds_wider_than_clinical_range() {
        let mut config = ExtractionConfig::default();
        config.bounds.meth_level = NumericBounds::new(0.0, 200.0);
        assert!(matches!(config.validate(), Err(MethexError::Config(_))));

        let mut config = ExtractionConfig::default();
        config.bounds.age = NumericBounds::new(0.0, 999.0);
        assert!(config.validate().is_err());

        let mut config = ExtractionConfig::default();
        config.bounds.mb_dose = NumericBounds::new(-1.0, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_narrowed_bounds_are_accepted() {
        let mut config = ExtractionConfig::default();
        config.bounds.meth_level = NumericBounds::new(1.0, 90.0);
        config.bounds.age = NumericBounds::new(0.0, 18.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_src = r#"
            [scoring]
            causal_window_tokens = 5

            [scoring.field_weights.trigger]
            section_priority = 0.5
            causal_proximity = 0.5
            pattern_specificity = 0.0
        "#;
        let config: ExtractionConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.scoring.causal_window_tokens, 5);
        assert_eq!(config.scoring.weights_for(FieldType::Trigger).causal_proximity, 0.5);
        assert_eq!(config.bounds.meth_level, NumericBounds::new(0.0, 100.0));
        assert_eq!(config.quality.methylene_blue_label, "Methylene Blue");
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ExtractionConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: ExtractionConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.scoring.causal_window_tokens, config.scoring.causal_window_tokens);
        assert_eq!(parsed.quality.informative_fields, config.quality.informative_fields);
    }

    #[test]
    fn test_toml_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("methex-config-{}.toml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = ExtractionConfig::default();
        config.scoring.causal_window_tokens = 12;
        config.to_toml(&path).unwrap();

        let loaded = ExtractionConfig::from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.scoring.causal_window_tokens, 12);
        assert_eq!(loaded.scoring.field_weights.len(), config.scoring.field_weights.len());
    }

    #[test]
    fn test_bounds_contains_is_inclusive() {
        let b = NumericBounds::new(0.0, 100.0);
        assert!(b.contains(0.0));
        assert!(b.contains(100.0));
        assert!(!b.contains(150.0));
        assert!(!b.contains(f64::NAN));
    }
}
