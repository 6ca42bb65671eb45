//! Chunk vector stores.
//!
//! [`LanceStore`] persists chunk rows in a LanceDB table and answers cosine
//! top-k queries. It owns a tokio runtime so the [`VectorStore`] surface stays
//! synchronous. [`InMemoryStore`] is a brute-force stand-in with the same
//! semantics.

use std::path::Path;

use lancedb::Connection;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use sciqa_core::error::{Error, Result};
use sciqa_core::traits::VectorStore;
use sciqa_core::types::{Hit, IndexEntry};

pub mod memory;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use memory::InMemoryStore;

pub struct LanceStore {
	rt: Runtime,
	db: Connection,
	table_name: String,
	dim: usize,
}

impl LanceStore {
	/// Connect to (or create) the database directory at `db_path`. The table
	/// itself is created by the first upsert.
	pub fn open(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
		let rt = Runtime::new().map_err(anyhow::Error::from)?;
		let uri = db_path.to_string_lossy().to_string();
		let db = rt.block_on(table::open_db(&uri))?;
		info!(db = %uri, table = table_name, dim, "opened LanceDB store");
		Ok(Self { rt, db, table_name: table_name.to_string(), dim })
	}

	pub fn table_name(&self) -> &str { &self.table_name }

	pub fn dim(&self) -> usize { self.dim }

	pub fn exists(&self) -> Result<bool> {
		Ok(self.rt.block_on(table::table_exists(&self.db, &self.table_name))?)
	}

	fn missing(&self) -> Error {
		Error::NotFound(format!("collection '{}' does not exist; ingest documents first", self.table_name))
	}
}

impl VectorStore for LanceStore {
	fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
		self.rt.block_on(writer::upsert_entries(&self.db, &self.table_name, entries, self.dim))?;
		Ok(())
	}

	fn delete_stale(&self, doc_id: &str, keep: usize) -> Result<usize> {
		let removed = self.rt.block_on(async {
			match table::open_table(&self.db, &self.table_name).await? {
				Some(t) => writer::delete_stale_chunks(&t, doc_id, keep).await,
				None => Ok(0),
			}
		})?;
		if removed > 0 {
			debug!(doc_id, keep, removed, "deleted stale chunks");
		}
		Ok(removed)
	}

	fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Hit>> {
		if vector.len() != self.dim {
			return Err(Error::Other(anyhow::anyhow!("query vector has {} dims, store expects {}", vector.len(), self.dim)));
		}
		let hits = self.rt.block_on(async {
			match table::open_table(&self.db, &self.table_name).await? {
				Some(t) => search::vector_search(&t, vector, k).await.map(Some),
				None => Ok(None),
			}
		})?;
		hits.ok_or_else(|| self.missing())
	}

	fn count(&self) -> Result<usize> {
		Ok(self.rt.block_on(table::count_rows(&self.db, &self.table_name))?)
	}

	fn reset(&self) -> Result<()> {
		let removed = self.rt.block_on(table::clear_table(&self.db, &self.table_name))?;
		info!(table = %self.table_name, removed, "collection reset");
		Ok(())
	}
}
