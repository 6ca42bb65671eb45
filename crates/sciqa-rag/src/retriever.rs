use std::sync::Arc;

use tracing::debug;

use sciqa_core::config::clamp_top_k;
use sciqa_core::error::{Error, Result};
use sciqa_core::traits::{Embedder, VectorStore};
use sciqa_core::types::Hit;

/// Embeds a question with the ingestion embedder and asks the store for its
/// nearest chunks.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self { embedder, store, top_k: clamp_top_k(top_k) }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn retrieve(&self, question: &str) -> Result<Vec<Hit>> {
        self.retrieve_k(question, self.top_k)
    }

    /// `k` is clamped to the supported retrieval depth.
    pub fn retrieve_k(&self, question: &str, k: usize) -> Result<Vec<Hit>> {
        let k = clamp_top_k(k);
        let vector = self
            .embedder
            .embed_batch(&[question.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Other(anyhow::anyhow!("embedder returned no vector for the query")))?;
        let hits = self.store.query(&vector, k)?;
        debug!(k, hits = hits.len(), "retrieved");
        Ok(hits)
    }
}
