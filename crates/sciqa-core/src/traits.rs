use crate::error::Result;
use crate::types::{Hit, IndexEntry};

/// Sentence embedder. Vectors must be L2-normalized and of length `dim()`,
/// and the same implementation must serve ingestion and queries.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Turns raw file bytes into per-page text. Unreadable pages may be empty.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>>;
}

/// Persisted nearest-neighbour index over chunk embeddings.
pub trait VectorStore: Send + Sync {
    /// Add-or-replace by `chunk.id`.
    fn upsert(&self, entries: &[IndexEntry]) -> Result<()>;
    /// Drop chunks of `doc_id` whose index is `>= keep`, left over from a
    /// previous ingestion that produced more chunks.
    fn delete_stale(&self, doc_id: &str, keep: usize) -> Result<usize>;
    /// Top `k` hits ordered by ascending distance. Fails with
    /// [`Error::NotFound`](crate::error::Error::NotFound) when nothing was
    /// ever ingested.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>>;
    fn count(&self) -> Result<usize>;
    /// Drop the whole collection.
    fn reset(&self) -> Result<()>;
}

/// Text generation backend. `Ok(None)` means the call succeeded but produced
/// no usable text. Quota failures must surface as
/// [`Error::ResourceExhausted`](crate::error::Error::ResourceExhausted).
pub trait Generator: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>>;
}

/// Decides whether a paragraph carries mathematical content.
pub trait EquationDetector: Send + Sync {
    fn looks_like_equation(&self, text: &str) -> bool;
}
