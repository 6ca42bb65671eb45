//! Document-level pipeline: pages → normalized text → sections → chunks with
//! document-wide indices.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chunker::{ChunkingConfig, EquationAwareChunker, HeuristicEquationDetector};
use crate::normalize::normalize;
use crate::sections::{split_sections, Section, PARAGRAPH_BREAK};
use crate::traits::EquationDetector;
use crate::types::{chunk_id, Document, DocumentChunk};

pub struct DocumentProcessor<D = HeuristicEquationDetector> {
    chunker: EquationAwareChunker<D>,
}

impl DocumentProcessor {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { chunker: EquationAwareChunker::new(config) }
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

impl<D: EquationDetector> DocumentProcessor<D> {
    pub fn with_chunker(chunker: EquationAwareChunker<D>) -> Self {
        Self { chunker }
    }

    pub fn chunker(&self) -> &EquationAwareChunker<D> {
        &self.chunker
    }

    /// Pages are joined with a blank line so a page break also ends a paragraph.
    pub fn sections(&self, pages: &[String]) -> Vec<Section> {
        split_sections(&normalize(&pages.join(PARAGRAPH_BREAK)))
    }

    /// Chunk every section and number the result 0..N-1 across the whole
    /// document. An empty vec means the document has nothing to index.
    pub fn chunk_document(&self, doc: &Document, pages: &[String]) -> Vec<DocumentChunk> {
        let sections = self.sections(pages);
        let mut chunks = Vec::new();
        for section in &sections {
            for span in self.chunker.chunk_spans(&section.text) {
                let chunk_index = chunks.len();
                chunks.push(DocumentChunk {
                    id: chunk_id(&doc.id, chunk_index),
                    doc_id: doc.id.clone(),
                    doc_path: doc.source.clone(),
                    section: section.heading.clone(),
                    content: span.text,
                    chunk_index,
                    total_chunks: 0,
                    overlap_chars: span.overlap_chars,
                });
            }
        }
        let total_chunks = chunks.len();
        for chunk in &mut chunks {
            chunk.total_chunks = total_chunks;
        }
        debug!(doc_id = %doc.id, sections = sections.len(), chunks = total_chunks, "document chunked");
        chunks
    }
}

/// All `*.pdf` files under `root` (case-insensitive extension), sorted.
pub fn list_pdf_files(root: &Path) -> Vec<PathBuf> {
    let mut pdf_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdf_files.sort();
    pdf_files
}
