//! Question answering over a private corpus of scientific papers.
//!
//! [`Rag`] wires the pieces together from [`Settings`]: the sentence embedder,
//! the LanceDB chunk store, the PDF ingestion pipeline and the Gemini-backed
//! answer path. It is immutable; changing settings means building a new one.

use std::sync::Arc;

use tracing::info;

use sciqa_core::chunker::{EquationAwareChunker, HeuristicEquationDetector};
use sciqa_core::config::Settings;
use sciqa_core::document::DocumentProcessor;
use sciqa_core::error::Result;
use sciqa_core::traits::{Embedder, EquationDetector, Generator, TextExtractor, VectorStore};
use sciqa_core::types::Answer;
use sciqa_embed::get_default_embedder;
use sciqa_vector::LanceStore;

pub mod answer;
pub mod eval;
pub mod extract;
pub mod generate;
pub mod indexer;
pub mod prompt;
pub mod retriever;

pub use answer::{AnswerOrchestrator, NO_RESPONSE};
pub use extract::{PdfExtractor, PlainTextExtractor};
pub use generate::GeminiClient;
pub use indexer::{CorpusIndexer, DocumentReport, IndexReport};
pub use retriever::Retriever;

pub struct Rag {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl Rag {
    /// Assemble from explicit collaborators.
    pub fn build(settings: &Settings, embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { settings: settings.clone(), embedder, store }
    }

    /// Embedder from `embedding.*`, LanceDB store from `data.*`.
    pub fn open(settings: &Settings) -> Result<Self> {
        let embedder: Arc<dyn Embedder> =
            Arc::from(get_default_embedder(settings.model_dir().as_deref(), settings.embedding.max_len)?);
        let db_path = settings.lancedb_dir();
        let store = LanceStore::open(&db_path, &settings.data.table, embedder.dim())?;
        info!(db = %db_path.display(), table = %settings.data.table, dim = embedder.dim(), "pipeline ready");
        Ok(Self::build(settings, embedder, Arc::new(store)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn VectorStore {
        self.store.as_ref()
    }

    pub fn indexer(&self, extractor: Box<dyn TextExtractor>) -> CorpusIndexer {
        self.indexer_with_detector(extractor, HeuristicEquationDetector)
    }

    /// Indexer whose chunker decides equation boundaries with `detector`.
    pub fn indexer_with_detector<D: EquationDetector>(
        &self,
        extractor: Box<dyn TextExtractor>,
        detector: D,
    ) -> CorpusIndexer<D> {
        let chunker = EquationAwareChunker::with_detector(self.settings.chunking, detector);
        CorpusIndexer::new(
            DocumentProcessor::with_chunker(chunker),
            extractor,
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
        )
        .with_batch_size(self.settings.embedding.batch_size)
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(Arc::clone(&self.embedder), Arc::clone(&self.store), self.settings.top_k())
    }

    /// `model` overrides `generation.model` for this orchestrator only.
    pub fn orchestrator(&self, generator: Box<dyn Generator>, model: Option<&str>) -> AnswerOrchestrator {
        let generation = &self.settings.generation;
        AnswerOrchestrator::new(
            self.retriever(),
            generator,
            model.unwrap_or(generation.model.as_str()),
            generation.fallback_model.as_str(),
        )
    }

    /// Orchestrator backed by Gemini. Fails with `InvalidConfig` when no API
    /// key is configured.
    pub fn gemini_orchestrator(&self, model: Option<&str>) -> Result<AnswerOrchestrator> {
        let client = GeminiClient::from_settings(&self.settings)?;
        Ok(self.orchestrator(Box::new(client), model))
    }

    pub fn answer(&self, generator: Box<dyn Generator>, question: &str) -> Result<Answer> {
        self.orchestrator(generator, None).answer(question)
    }
}
