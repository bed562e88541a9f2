//! The Lexicon Store: everything the scanner and segmenter need to know about
//! the domain vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use methex_common::{FieldType, SectionLabel};

use crate::rules::{Rule, RuleKind};
use crate::{LexiconError, Result};

pub const GENDER_LABELS: &[&str] = &["Male", "Female"];
pub const OUTCOME_LABELS: &[&str] = &["Recovered", "Fatal", "Admitted", "Unknown"];
pub const G6PD_LABELS: &[&str] = &["Deficient", "Normal", "Mentioned"];

/// A heading phrase and the section it opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRule {
    pub phrase: String,
    pub label: SectionLabel,
}

impl HeadingRule {
    pub fn new(phrase: &str, label: SectionLabel) -> Self {
        Self { phrase: phrase.to_string(), label }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconStore {
    /// Known clinical headings, matched against whole normalised lines
    #[serde(default)]
    pub headings: Vec<HeadingRule>,

    /// Phrases asserting causation ("due to", "induced by", ...)
    #[serde(default)]
    pub causal_phrases: Vec<String>,

    /// Ranked rules per structured field
    #[serde(default)]
    pub fields: BTreeMap<FieldType, Vec<Rule>>,

    #[serde(default)]
    pub symptoms: Vec<Rule>,

    /// Exposure/administration routes
    #[serde(default)]
    pub routes: Vec<Rule>,

    /// Time from treatment to improvement; values normalise to minutes
    #[serde(default)]
    pub time_to_improvement: Vec<Rule>,
}

impl LexiconStore {
    /// The built-in methemoglobinemia lexicon.
    pub fn embedded() -> Self {
        crate::embedded::store()
    }

    /// Load from YAML file
    pub fn from_yaml(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_yaml::from_str(&content)?;
        info!("Loaded lexicon from {}: {} rules", path, store.rule_count());
        Ok(store)
    }

    /// Load from JSON file
    pub fn from_json(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = serde_json::from_str(&content)?;
        info!("Loaded lexicon from {}: {} rules", path, store.rule_count());
        Ok(store)
    }

    /// Load by extension: `.json` is JSON, anything else YAML.
    pub fn from_path(path: &str) -> Result<Self> {
        if path.to_lowercase().ends_with(".json") {
            Self::from_json(path)
        } else {
            Self::from_yaml(path)
        }
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: &str) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn rules_for(&self, field: FieldType) -> &[Rule] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rule_count(&self) -> usize {
        self.fields.values().map(Vec::len).sum::<usize>()
            + self.symptoms.len()
            + self.routes.len()
            + self.time_to_improvement.len()
    }

    /// Check every rule and the closed label sets.
    ///
    /// Numeric fields need regex rules with a capture group; label fields,
    /// symptoms and routes need a label on every rule; gender, outcome and
    /// G6PD labels must come from their closed sets.
    pub fn validate(&self) -> Result<()> {
        for heading in &self.headings {
            if heading.phrase.trim().is_empty() {
                return Err(LexiconError::InvalidRule("empty heading phrase".to_string()));
            }
        }
        if self.causal_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(LexiconError::InvalidRule("empty causal phrase".to_string()));
        }

        for (field, rules) in &self.fields {
            for rule in rules {
                if field.is_numeric() {
                    check_numeric(rule, field.as_str())?;
                } else {
                    let label = check_labelled(rule, field.as_str())?;
                    let closed = match field {
                        FieldType::Gender     => Some(GENDER_LABELS),
                        FieldType::Outcome    => Some(OUTCOME_LABELS),
                        FieldType::G6pdStatus => Some(G6PD_LABELS),
                        _ => None,
                    };
                    if let Some(allowed) = closed {
                        if !allowed.contains(&label) {
                            return Err(LexiconError::InvalidRule(format!(
                                "{field} label '{label}' not in {allowed:?}"
                            )));
                        }
                    }
                }
            }
        }

        for rule in self.symptoms.iter().chain(&self.routes) {
            check_labelled(rule, "symptom/route")?;
        }
        for rule in &self.time_to_improvement {
            check_numeric(rule, "time_to_improvement")?;
        }

        Ok(())
    }
}

fn check_labelled<'a>(rule: &'a Rule, context: &str) -> Result<&'a str> {
    rule.validate()?;
    check_exclude(rule)?;
    if rule.kind == RuleKind::Regex {
        regex::Regex::new(&rule.pattern)?;
    }
    rule.label.as_deref().ok_or_else(|| {
        LexiconError::InvalidRule(format!("{context} rule '{}' has no label", rule.pattern))
    })
}

fn check_exclude(rule: &Rule) -> Result<()> {
    if let Some(exclude) = &rule.exclude {
        regex::Regex::new(exclude)?;
    }
    Ok(())
}

fn check_numeric(rule: &Rule, context: &str) -> Result<()> {
    rule.validate()?;
    check_exclude(rule)?;
    if rule.kind != RuleKind::Regex {
        return Err(LexiconError::InvalidRule(format!(
            "{context} rule '{}' must be a regex",
            rule.pattern
        )));
    }
    let re = regex::Regex::new(&rule.pattern)?;
    if re.captures_len() < 2 {
        return Err(LexiconError::InvalidRule(format!(
            "{context} rule '{}' has no capture group",
            rule.pattern
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_is_valid() {
        let store = LexiconStore::embedded();
        store.validate().unwrap();
        for field in FieldType::ALL {
            assert!(!store.rules_for(field).is_empty(), "no rules for {field}");
        }
    }

    #[test]
    fn test_rejects_unknown_gender_label() {
        let mut store = LexiconStore::embedded();
        store
            .fields
            .entry(FieldType::Gender)
            .or_default()
            .push(Rule::phrase("lady", "F", 0.5));
        assert!(matches!(store.validate(), Err(LexiconError::InvalidRule(_))));
    }

    #[test]
    fn test_rejects_numeric_phrase_rule() {
        let mut store = LexiconStore::embedded();
        store
            .fields
            .entry(FieldType::Age)
            .or_default()
            .push(Rule::phrase("elderly", "70", 0.5));
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_rejects_invalid_exclude_pattern() {
        let mut store = LexiconStore::embedded();
        store
            .fields
            .entry(FieldType::MethLevel)
            .or_default()
            .push(Rule::regex(r"(\d+)\s*%", 0.2).with_exclude("(spo2"));
        assert!(matches!(store.validate(), Err(LexiconError::Pattern(_))));
    }

    #[test]
    fn test_yaml_lexicon_parses() {
        let yaml = r#"
headings:
  - phrase: case report
    label: case_presentation
causal_phrases: [due to]
fields:
  treatment:
    - pattern: methylene blue
      label: Methylene Blue
      specificity: 1.0
    - pattern: blue
      label: Blue
"#;
        let store: LexiconStore = serde_yaml::from_str(yaml).unwrap();
        store.validate().unwrap();
        assert_eq!(store.rules_for(FieldType::Treatment).len(), 2);
        assert!(store.rules_for(FieldType::Trigger).is_empty());
        assert_eq!(store.headings[0].label, SectionLabel::CasePresentation);
    }
}
