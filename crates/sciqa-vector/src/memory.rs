use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;

use sciqa_core::error::{Error, Result};
use sciqa_core::traits::VectorStore;
use sciqa_core::types::{Hit, IndexEntry};

/// Brute-force cosine store kept in memory. Like a fresh LanceDB directory it
/// reports `NotFound` on query until the first upsert.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Option<BTreeMap<String, IndexEntry>>>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let ma = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if ma == 0.0 || mb == 0.0 {
        return 1.0;
    }
    1.0 - dot / (ma * mb)
}

fn poisoned<T>(_: T) -> Error {
    Error::Other(anyhow!("in-memory store lock poisoned"))
}

impl VectorStore for InMemoryStore {
    fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut guard = self.rows.write().map_err(poisoned)?;
        let rows = guard.get_or_insert_with(BTreeMap::new);
        for e in entries {
            rows.insert(e.chunk.id.clone(), e.clone());
        }
        Ok(())
    }

    fn delete_stale(&self, doc_id: &str, keep: usize) -> Result<usize> {
        let mut guard = self.rows.write().map_err(poisoned)?;
        let Some(rows) = guard.as_mut() else { return Ok(0) };
        let before = rows.len();
        rows.retain(|_, e| !(e.chunk.doc_id == doc_id && e.chunk.chunk_index >= keep));
        Ok(before - rows.len())
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
        let guard = self.rows.read().map_err(poisoned)?;
        let rows = guard
            .as_ref()
            .ok_or_else(|| Error::NotFound("collection does not exist; ingest documents first".into()))?;
        let mut hits: Vec<Hit> = rows
            .values()
            .map(|e| Hit {
                content: e.chunk.content.clone(),
                meta: e.chunk.meta(),
                distance: cosine_distance(vector, &e.vector),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.rows.read().map_err(poisoned)?.as_ref().map_or(0, BTreeMap::len))
    }

    fn reset(&self) -> Result<()> {
        if let Some(rows) = self.rows.write().map_err(poisoned)?.as_mut() {
            rows.clear();
        }
        Ok(())
    }
}
