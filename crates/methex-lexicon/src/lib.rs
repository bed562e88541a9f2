//! Domain lexicon for methemoglobinemia case reports.
//!
//! The lexicon is pure data: ranked `(pattern, specificity, canonical label)`
//! rules per field, section headings, causal-relation phrases, symptoms and
//! exposure routes. [`CompiledRules`] turns a rule list into a matcher
//! (Aho-Corasick for phrases, `regex` for numeric patterns).

pub mod embedded;
pub mod matcher;
pub mod rules;
pub mod store;

pub use matcher::{collapse_overlapping, CompiledRules, RuleMatch};
pub use rules::{Rule, RuleKind};
pub use store::{HeadingRule, LexiconStore};

pub type Result<T> = std::result::Result<T, LexiconError>;

#[derive(Debug, thiserror::Error)]
pub enum LexiconError {
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Automaton build failed: {0}")]
    Automaton(#[from] aho_corasick::BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
