//! Ranked extraction rules.

use serde::{Deserialize, Serialize};

use crate::{LexiconError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Literal phrase, matched case-insensitively on word boundaries
    Phrase,
    /// Regular expression; capture group 1 (if any) holds the value
    Regex,
}

fn default_kind() -> RuleKind { RuleKind::Phrase }
fn default_specificity() -> f64 { 0.8 }
fn default_multiplier() -> f64 { 1.0 }

/// One `(pattern, specificity, canonical label)` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "default_kind")]
    pub kind: RuleKind,

    pub pattern: String,

    /// How unambiguous a hit on this rule is, in [0, 1]
    #[serde(default = "default_specificity")]
    pub specificity: f64,

    /// Canonical label emitted for a hit. Numeric rules leave this empty.
    #[serde(default)]
    pub label: Option<String>,

    /// Scale applied to the captured number (months to years, hours to minutes)
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Hits whose matched text contains this pattern are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl Rule {
    pub fn phrase(pattern: &str, label: &str, specificity: f64) -> Self {
        Self {
            kind: RuleKind::Phrase,
            pattern: pattern.to_string(),
            specificity,
            label: Some(label.to_string()),
            multiplier: 1.0,
            exclude: None,
        }
    }

    /// Numeric regex rule; the value is read from capture group 1.
    pub fn regex(pattern: &str, specificity: f64) -> Self {
        Self {
            kind: RuleKind::Regex,
            pattern: pattern.to_string(),
            specificity,
            label: None,
            multiplier: 1.0,
            exclude: None,
        }
    }

    /// Regex rule that classifies into a label instead of capturing a number.
    pub fn labelled_regex(pattern: &str, label: &str, specificity: f64) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::regex(pattern, specificity)
        }
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_exclude(mut self, exclude: &str) -> Self {
        self.exclude = Some(exclude.to_string());
        self
    }

    /// Structural checks that do not need the pattern compiled.
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(LexiconError::InvalidRule("empty pattern".to_string()));
        }
        if !(0.0..=1.0).contains(&self.specificity) {
            return Err(LexiconError::InvalidRule(format!(
                "specificity {} out of [0, 1] for '{}'",
                self.specificity, self.pattern
            )));
        }
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(LexiconError::InvalidRule(format!(
                "multiplier must be positive for '{}'",
                self.pattern
            )));
        }
        if self.exclude.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(LexiconError::InvalidRule(format!(
                "blank exclude pattern for '{}'",
                self.pattern
            )));
        }
        if self.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
            return Err(LexiconError::InvalidRule(format!(
                "blank label for '{}'",
                self.pattern
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_defaults() {
        let rule: Rule = serde_yaml::from_str("pattern: dapsone\nlabel: Dapsone\n").unwrap();
        assert_eq!(rule.kind, RuleKind::Phrase);
        assert_eq!(rule.specificity, 0.8);
        assert_eq!(rule.multiplier, 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_specificity() {
        assert!(Rule::phrase("dapsone", "Dapsone", 1.5).validate().is_err());
        assert!(Rule::phrase("  ", "Dapsone", 0.5).validate().is_err());
        assert!(Rule::regex(r"(\d+)", 0.5).with_multiplier(0.0).validate().is_err());
        assert!(Rule::phrase("dapsone", "Dapsone", 1.0).validate().is_ok());
    }
}
