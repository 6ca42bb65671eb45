//! Domain types shared by the chunking pipeline, the vector stores and the
//! answer path.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub type ChunkId = String;

/// Length of a document fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 12;

/// Deterministic content fingerprint: blake3 of the raw bytes, hex encoded and
/// truncated to [`FINGERPRINT_LEN`] characters.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hex = blake3::hash(bytes).to_hex().to_string();
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Stable chunk address within the index: `{fingerprint}_{chunk_index}`.
pub fn chunk_id(doc_id: &str, chunk_index: usize) -> ChunkId {
    format!("{doc_id}_{chunk_index}")
}

/// An ingested source file. Identity is derived from content only, so
/// re-ingesting identical bytes from another path yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source: String,
}

impl Document {
    pub fn from_bytes(source: impl Into<String>, bytes: &[u8]) -> Self {
        Self { id: fingerprint(bytes), source: source.into() }
    }
}

/// A chunk of a source document that is independently indexed.
///
/// - `id`: `{doc_id}_{chunk_index}`
/// - `doc_id`: fingerprint of the owning document
/// - `doc_path`: original path to the source file
/// - `section`: lower-cased heading keyword of the section, `None` for the preamble
/// - `content`: the text payload, including any overlap prefix
/// - `chunk_index`/`total_chunks`: position within the whole document
/// - `overlap_chars`: length of the prefix copied from the previous chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: ChunkId,
    pub doc_id: String,
    pub doc_path: String,
    pub section: Option<String>,
    pub content: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub overlap_chars: usize,
}

impl DocumentChunk {
    pub fn meta(&self) -> ChunkMeta {
        ChunkMeta {
            doc_id: self.doc_id.clone(),
            chunk_index: self.chunk_index,
            source: self.doc_path.clone(),
            section: self.section.clone(),
        }
    }
}

/// A chunk paired with its embedding, ready to be written to a store.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: DocumentChunk,
    pub vector: Vec<f32>,
}

/// Provenance carried alongside every retrieved chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub doc_id: String,
    pub chunk_index: usize,
    pub source: String,
    pub section: Option<String>,
}

impl ChunkMeta {
    /// File name of the source path, or the full source when it has none.
    pub fn source_basename(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.source)
    }
}

/// One retrieved chunk. `distance` is the store's vector distance: lower is
/// nearer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub content: String,
    pub meta: ChunkMeta,
    pub distance: f32,
}

/// Result of answering one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub citations: String,
    pub hits: Vec<Hit>,
    /// Model that actually produced `text` (the fallback after a quota error).
    pub model: String,
}
