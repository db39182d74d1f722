//! Embedding client trait and vector utilities.
//!
//! Defines the [`EmbeddingClient`] trait that embedding backends implement,
//! plus pure helper functions for similarity computation and for combining an
//! article's head/body vectors into its effective semantic vector.
//!
//! Concrete client implementations (OpenAI) live in the `taxa` app crate.
//! The engine itself only consumes already-computed vectors; the trait exists
//! so callers can populate them through the same library boundary.

use anyhow::Result;
use async_trait::async_trait;

use crate::error::EngineError;

/// Weight of the title embedding in the combined article vector.
pub const HEAD_EMBEDDING_WEIGHT: f32 = 0.3;
/// Weight of the body embedding in the combined article vector.
pub const BODY_EMBEDDING_WEIGHT: f32 = 0.7;

/// Trait for embedding backends.
///
/// Implementations must tolerate being absent: the engine degrades to
/// keyword-plus-generative evidence when no client is configured.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` when either vector has zero magnitude. Callers that care
/// about length mismatches must check them first; this function treats a
/// mismatch as zero similarity.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Remap a raw cosine value from `[-1.0, 1.0]` to a confidence in `[0.0, 1.0]`.
///
/// Identical vectors map to `1.0`, opposites to `0.0`, orthogonal to `0.5`.
pub fn remap_to_unit(cosine: f32) -> f64 {
    (f64::from(cosine) + 1.0) / 2.0
}

/// Combine head and body embeddings into the article's effective vector,
/// weighted [`HEAD_EMBEDDING_WEIGHT`]/[`BODY_EMBEDDING_WEIGHT`].
///
/// When only one side is present it is used as-is. Returns `None` when
/// neither is present, and [`EngineError::DimensionMismatch`] when both are
/// present with different lengths.
pub fn combine_embeddings(
    head: Option<&[f32]>,
    body: Option<&[f32]>,
) -> Result<Option<Vec<f32>>, EngineError> {
    match (head, body) {
        (Some(h), Some(b)) => {
            if h.len() != b.len() {
                return Err(EngineError::DimensionMismatch {
                    expected: h.len(),
                    actual: b.len(),
                    context: "article head vs body embedding".to_string(),
                });
            }
            let combined = h
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x * HEAD_EMBEDDING_WEIGHT + y * BODY_EMBEDDING_WEIGHT)
                .collect();
            Ok(Some(combined))
        }
        (Some(h), None) => Ok(Some(h.to_vec())),
        (None, Some(b)) => Ok(Some(b.to_vec())),
        (None, None) => Ok(None),
    }
}
