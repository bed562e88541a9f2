use serde::{Deserialize, Serialize};

/// A case report as supplied by the caller: already-decoded text plus an
/// identifier (usually a PubMed id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "document_id", alias = "pmid")]
    pub id: String,
    #[serde(alias = "text")]
    pub raw_text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self { id: id.into(), raw_text: raw_text.into() }
    }
}
