//! Retrieval evaluation over a JSONL question set.
//!
//! Each line is `{"question": "...", "refs": ["<doc fingerprint>", ...]}`;
//! blank lines are ignored. A question scores a hit when any retrieved chunk
//! belongs to one of its reference documents.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sciqa_core::error::{Error, Result};
use sciqa_core::types::Hit;

use crate::retriever::Retriever;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaExample {
    pub question: String,
    #[serde(default)]
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionOutcome {
    pub question: String,
    pub hit: bool,
    pub retrieved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub k: usize,
    pub questions: usize,
    pub hits: usize,
    pub hit_rate: f64,
    pub outcomes: Vec<QuestionOutcome>,
}

pub fn load_qas(path: &Path) -> Result<Vec<QaExample>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    parse_qas(BufReader::new(file))
}

pub fn parse_qas(reader: impl BufRead) -> Result<Vec<QaExample>> {
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(anyhow::Error::from)?;
        if line.trim().is_empty() {
            continue;
        }
        let ex: QaExample = serde_json::from_str(&line)
            .map_err(|e| Error::InvalidConfig(format!("question set line {}: {e}", lineno + 1)))?;
        out.push(ex);
    }
    Ok(out)
}

pub fn hit_at_k(refs: &[String], hits: &[Hit]) -> bool {
    let got: HashSet<&str> = hits.iter().map(|h| h.meta.doc_id.as_str()).collect();
    refs.iter().any(|r| got.contains(r.as_str()))
}

pub fn evaluate(retriever: &Retriever, examples: &[QaExample], k: usize) -> Result<EvalReport> {
    if examples.is_empty() {
        return Err(Error::EmptyInput("question set has no questions".into()));
    }
    let mut outcomes = Vec::with_capacity(examples.len());
    for ex in examples {
        let hits = retriever.retrieve_k(&ex.question, k)?;
        let hit = hit_at_k(&ex.refs, &hits);
        debug!(question = %ex.question, hit, "evaluated");
        let mut retrieved: Vec<String> = Vec::new();
        for h in &hits {
            if !retrieved.contains(&h.meta.doc_id) {
                retrieved.push(h.meta.doc_id.clone());
            }
        }
        outcomes.push(QuestionOutcome { question: ex.question.clone(), hit, retrieved });
    }
    let hits = outcomes.iter().filter(|o| o.hit).count();
    Ok(EvalReport {
        k: sciqa_core::config::clamp_top_k(k),
        questions: outcomes.len(),
        hits,
        hit_rate: hits as f64 / outcomes.len() as f64,
        outcomes,
    })
}
