use thiserror::Error;

use methex_common::MethexError;
use methex_lexicon::LexiconError;

/// Errors raised while building an [`ExtractionPipeline`](crate::ExtractionPipeline).
/// Processing a document never fails.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Config(#[from] MethexError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
