use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sciqa_core::config::{Config, Settings};
use sciqa_core::document::DocumentProcessor;
use sciqa_core::error::Error;
use sciqa_core::traits::TextExtractor;
use sciqa_core::types::{Answer, Document};
use sciqa_rag::eval::{evaluate, load_qas};
use sciqa_rag::{GeminiClient, PdfExtractor, Rag};

#[derive(Parser, Debug)]
#[command(name = "sciqa", version, about = "Cited question answering over a private corpus of scientific papers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract, chunk, embed and store every PDF under a directory (or one PDF).
    Ingest {
        /// Defaults to `data.papers_dir`.
        path: Option<PathBuf>,
        /// Empty the collection before ingesting.
        #[arg(long)]
        reset: bool,
    },
    /// Show how a PDF is split into sections and chunks without indexing it.
    Parse {
        path: PathBuf,
        /// Characters of the first chunk to print.
        #[arg(long, default_value_t = 400)]
        preview: usize,
    },
    /// Answer a question from the ingested papers.
    Ask {
        question: String,
        #[arg(long = "top-k")]
        top_k: Option<usize>,
        /// Primary generation model; the configured fallback still applies.
        #[arg(long)]
        model: Option<String>,
        /// Print the retrieved chunks after the answer.
        #[arg(long = "show-context")]
        show_context: bool,
        #[arg(long)]
        json: bool,
    },
    /// Hit@K of retrieval over a JSONL question set.
    Eval {
        /// Defaults to `data.qas_path`.
        path: Option<PathBuf>,
        #[arg(long = "top-k")]
        top_k: Option<usize>,
    },
    /// Show where the collection lives and how many chunks it holds.
    Status,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    init_tracing();
    let cli = Cli::parse();
    let settings = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?.settings()?;

    match cli.command {
        Commands::Ingest { path, reset } => ingest(&settings, path, reset),
        Commands::Parse { path, preview } => parse(&settings, &path, preview),
        Commands::Ask { question, top_k, model, show_context, json } => {
            // credentials are checked before any model or index is loaded
            let client = GeminiClient::from_settings(&settings)?;
            let rag = Rag::open(&settings)?;
            let orchestrator = rag.orchestrator(Box::new(client), model.as_deref());
            info!(model = orchestrator.model(), fallback = %settings.generation.fallback_model, "answering");
            let answer = match top_k {
                Some(k) => orchestrator.answer_k(&question, k)?,
                None => orchestrator.answer(&question)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                print_answer(&answer, show_context);
            }
            Ok(())
        }
        Commands::Eval { path, top_k } => {
            let path = path.unwrap_or_else(|| sciqa_core::config::expand_path(&settings.data.qas_path));
            let examples = load_qas(&path)?;
            let rag = Rag::open(&settings)?;
            let report = evaluate(&rag.retriever(), &examples, top_k.unwrap_or_else(|| settings.top_k()))?;
            for o in report.outcomes.iter().filter(|o| !o.hit) {
                println!("miss: {} -> {}", o.question, o.retrieved.join(", "));
            }
            println!("Hit@{}: {:.3} ({}/{})", report.k, report.hit_rate, report.hits, report.questions);
            Ok(())
        }
        Commands::Status => {
            let rag = Rag::open(&settings)?;
            println!("Database:   {}", settings.lancedb_dir().display());
            println!("Collection: {}", settings.data.table);
            println!("Chunks:     {}", rag.store().count()?);
            Ok(())
        }
    }
}

fn ingest(settings: &Settings, path: Option<PathBuf>, reset: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(|| settings.papers_dir());
    let rag = Rag::open(settings)?;
    let indexer = rag.indexer(Box::new(PdfExtractor)).with_progress(true);
    if path.is_file() {
        if reset {
            rag.store().reset()?;
        }
        match indexer.index_path(&path) {
            Ok(r) => println!("Indexed {} ({} chunks, doc_id {})", r.source, r.chunks, r.doc_id),
            Err(Error::EmptyInput(reason)) => println!("skipped {}: {}", path.display(), reason),
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }
    let report = indexer.index_directory(&path, reset)?;
    for s in &report.skipped {
        println!("skipped {}: {}", s.source, s.reason);
    }
    info!(dir = %path.display(), "ingest complete");
    println!(
        "Ingest complete: {} papers, {} chunks written, {} skipped, {} chunks in '{}'",
        report.indexed.len(),
        report.chunks_written,
        report.skipped.len(),
        report.collection_count,
        settings.data.table
    );
    Ok(())
}

fn parse(settings: &Settings, path: &Path, preview: usize) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let pages = PdfExtractor.extract(&bytes).with_context(|| format!("extracting {}", path.display()))?;
    let doc = Document::from_bytes(path.to_string_lossy(), &bytes);
    let processor = DocumentProcessor::new(settings.chunking);
    let sections = processor.sections(&pages);
    let chunks = processor.chunk_document(&doc, &pages);
    let config = processor.chunker().config();

    println!("Document:  {} (doc_id {})", doc.source, doc.id);
    println!("Pages:     {}", pages.len());
    println!(
        "Chunking:  target {} chars, overlap {}, early flush at {:.0}%",
        config.target_chars,
        config.overlap_chars,
        config.min_fill_ratio * 100.0
    );
    println!("Sections:  {}", sections.len());
    for s in &sections {
        println!("  {} ({} chars)", s.heading.as_deref().unwrap_or("-"), s.text.chars().count());
    }
    println!("Chunks:    {}", chunks.len());
    if let Some(first) = chunks.first() {
        let head: String = first.content.chars().take(preview).collect();
        println!("\nFirst chunk [{}]:\n{}", first.section.as_deref().unwrap_or("-"), head);
        if first.content.chars().count() > preview {
            println!("...");
        }
    }
    Ok(())
}

fn print_answer(answer: &Answer, show_context: bool) {
    println!("{}\n", answer.text);
    if !answer.citations.is_empty() {
        println!("Sources:\n{}", answer.citations);
    }
    if show_context {
        for h in &answer.hits {
            let section = h.meta.section.as_deref().unwrap_or("-");
            println!("\n[{}] chunk#{} d={:.3} section={} ({})", h.meta.doc_id, h.meta.chunk_index, h.distance, section, h.meta.source_basename());
            println!("{}", h.content);
        }
    }
}
