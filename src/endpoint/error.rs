//! Errors surfaced by interchange reads and writes

use crate::source::SourceError;
use thiserror::Error;

/// Failure of a `read` or `write` call.
///
/// Source failures keep the original error as their `source`, together with
/// the index of the failing source in the chain.
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("interchange read error at source {index}: {source}")]
    Read { index: usize, source: SourceError },

    #[error("interchange fallback requested at source {index}, but none available: {source}")]
    NoFallback { index: usize, source: SourceError },

    #[error("interchange write error at source {index}: {source}")]
    Write { index: usize, source: SourceError },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("write task failed: {0}")]
    Task(String),
}

impl InterchangeError {
    /// Index of the source that failed, if the error came from a source.
    pub fn source_index(&self) -> Option<usize> {
        match self {
            Self::Read { index, .. } | Self::NoFallback { index, .. } | Self::Write { index, .. } => {
                Some(*index)
            }
            Self::Configuration(_) | Self::Task(_) => None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Result type for interchange operations
pub type InterchangeResult<T> = Result<T, InterchangeError>;
