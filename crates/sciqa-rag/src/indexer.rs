//! Corpus ingestion: bytes → chunks → embeddings → store.
//!
//! Every document is keyed by its content fingerprint and every chunk by
//! `{fingerprint}_{index}`, so re-running ingestion over the same corpus
//! replaces rows in place. Chunks left over from a longer previous version of
//! a document are removed after the new rows are written.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use sciqa_core::chunker::HeuristicEquationDetector;
use sciqa_core::document::{list_pdf_files, DocumentProcessor};
use sciqa_core::error::{Error, Result};
use sciqa_core::traits::{Embedder, EquationDetector, TextExtractor, VectorStore};
use sciqa_core::types::{Document, DocumentChunk, IndexEntry};

pub const DEFAULT_EMBED_BATCH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub doc_id: String,
    pub source: String,
    pub chunks: usize,
    /// Rows of an older, longer version of the same document that were removed.
    pub stale_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexReport {
    pub indexed: Vec<DocumentReport>,
    pub skipped: Vec<SkippedDocument>,
    pub chunks_written: usize,
    /// Store row count after the run.
    pub collection_count: usize,
}

pub struct CorpusIndexer<D = HeuristicEquationDetector> {
    processor: DocumentProcessor<D>,
    extractor: Box<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
    show_progress: bool,
}

impl<D: EquationDetector> CorpusIndexer<D> {
    pub fn new(
        processor: DocumentProcessor<D>,
        extractor: Box<dyn TextExtractor>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self { processor, extractor, embedder, store, batch_size: DEFAULT_EMBED_BATCH, show_progress: false }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Index one document given its raw bytes. Fails with `EmptyInput` when
    /// the document yields no chunks; nothing is written in that case.
    pub fn index_document(&self, source: &str, bytes: &[u8]) -> Result<DocumentReport> {
        let doc = Document::from_bytes(source, bytes);
        let pages = self.extractor.extract(bytes).with_context(|| format!("extracting {source}"))?;
        self.index_pages(&doc, &pages)
    }

    pub fn index_path(&self, path: &Path) -> Result<DocumentReport> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        self.index_document(&path.to_string_lossy(), &bytes)
    }

    pub fn index_pages(&self, doc: &Document, pages: &[String]) -> Result<DocumentReport> {
        let chunks = self.processor.chunk_document(doc, pages);
        if chunks.is_empty() {
            return Err(Error::EmptyInput(format!("{} produced no chunks", doc.source)));
        }
        let start = Instant::now();
        for batch in chunks.chunks(self.batch_size) {
            self.store.upsert(&self.embed(batch)?)?;
        }
        let stale_removed = self.store.delete_stale(&doc.id, chunks.len())?;
        info!(
            doc_id = %doc.id,
            source = %doc.source,
            chunks = chunks.len(),
            stale_removed,
            elapsed_ms = start.elapsed().as_millis(),
            "indexed document"
        );
        Ok(DocumentReport { doc_id: doc.id.clone(), source: doc.source.clone(), chunks: chunks.len(), stale_removed })
    }

    fn embed(&self, chunks: &[DocumentChunk]) -> Result<Vec<IndexEntry>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts)?;
        if vectors.len() != chunks.len() {
            return Err(Error::Other(anyhow::anyhow!(
                "embedder returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }
        debug!(batch = chunks.len(), "embedded chunk batch");
        Ok(chunks.iter().cloned().zip(vectors).map(|(chunk, vector)| IndexEntry { chunk, vector }).collect())
    }

    /// Index every `*.pdf` under `dir` in sorted order. Unreadable files and
    /// documents without chunks are logged and skipped; store failures abort.
    pub fn index_directory(&self, dir: &Path, reset: bool) -> Result<IndexReport> {
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("papers directory {} does not exist", dir.display())));
        }
        if reset {
            self.store.reset()?;
        }
        let files = list_pdf_files(dir);
        info!(dir = %dir.display(), files = files.len(), reset, "ingesting directory");

        let pb = self.progress_bar(files.len());
        let mut report = IndexReport::default();
        for path in &files {
            pb.set_message(file_label(path));
            match self.load(path) {
                Ok((doc, pages)) => match self.index_pages(&doc, &pages) {
                    Ok(r) => {
                        report.chunks_written += r.chunks;
                        report.indexed.push(r);
                    }
                    Err(Error::EmptyInput(reason)) => {
                        warn!(source = %path.display(), "skipping document: {reason}");
                        report.skipped.push(SkippedDocument { source: doc.source, reason });
                    }
                    Err(e) => return Err(e),
                },
                Err(e) => {
                    warn!(source = %path.display(), error = %e, "skipping unreadable document");
                    report.skipped.push(SkippedDocument { source: path.to_string_lossy().into_owned(), reason: format!("{e:#}") });
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");

        report.collection_count = self.store.count()?;
        info!(
            indexed = report.indexed.len(),
            skipped = report.skipped.len(),
            chunks = report.chunks_written,
            collection = report.collection_count,
            "ingestion finished"
        );
        Ok(report)
    }

    fn load(&self, path: &Path) -> anyhow::Result<(Document, Vec<String>)> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let doc = Document::from_bytes(path.to_string_lossy(), &bytes);
        let pages = self.extractor.extract(&bytes)?;
        Ok((doc, pages))
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} papers ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

fn file_label(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

