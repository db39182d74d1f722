//! Error types for taxa-core.
//!
//! Classification deliberately returns empty result sets rather than errors
//! for "no evidence found" situations. [`EngineError`] covers the remaining
//! failure modes: integrity violations in the stored hierarchy, embedding
//! dimension mismatches, and catalog store read failures.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for taxa-core operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The stored category hierarchy contains a cycle. This indicates the
    /// cycle-prevention check was skipped upstream and is not recoverable.
    #[error("category hierarchy contains a cycle involving {0}")]
    HierarchyCycle(Uuid),

    /// Two embedding vectors of different lengths were compared. Silently
    /// truncating or padding would corrupt similarity scores.
    #[error("embedding dimension mismatch: expected {expected}, got {actual} ({context})")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// An article id was requested from the catalog store but does not exist.
    #[error("article not found: {0}")]
    ArticleNotFound(Uuid),

    /// A catalog store read failed.
    #[error("catalog store error: {0}")]
    Store(anyhow::Error),
}

impl From<anyhow::Error> for EngineError {
    fn from(e: anyhow::Error) -> Self {
        EngineError::Store(e)
    }
}
