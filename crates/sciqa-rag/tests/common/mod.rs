#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sciqa_core::config::Settings;
use sciqa_core::error::{Error, Result};
use sciqa_core::traits::{Generator, TextExtractor};
use sciqa_embed::FakeEmbedder;
use sciqa_rag::Rag;
use sciqa_vector::InMemoryStore;

pub const DIM: usize = 384;

pub fn rag(settings: &Settings) -> Rag {
    Rag::build(settings, Arc::new(FakeEmbedder::new(DIM)), Arc::new(InMemoryStore::new()))
}

pub fn paper(topic: &str, paragraphs: usize) -> String {
    let mut out = format!("Abstract\n\nThis paper studies {topic}.");
    out.push_str("\n\nIntroduction");
    for i in 0..paragraphs {
        out.push_str(&format!(
            "\n\nParagraph {i} on {topic}: we measure {topic} under controlled conditions and report the observed behaviour in detail."
        ));
    }
    out
}

/// Plain text, except bytes starting with `%BROKEN` fail to extract.
pub struct FlakyExtractor;

impl TextExtractor for FlakyExtractor {
    fn extract(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        if bytes.starts_with(b"%BROKEN") {
            anyhow::bail!("no text layer");
        }
        Ok(vec![String::from_utf8_lossy(bytes).into_owned()])
    }
}

/// Replays queued outcomes and records the model of every call.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    outcomes: Arc<Mutex<VecDeque<Result<Option<String>>>>>,
}

impl ScriptedGenerator {
    pub fn new(outcomes: Vec<Result<Option<String>>>) -> Self {
        Self { outcomes: Arc::new(Mutex::new(outcomes.into())), ..Self::default() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, model: &str, prompt: &str) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Generation("script exhausted".into())))
    }
}

pub fn exhausted(model: &str) -> Error {
    Error::ResourceExhausted { model: model.to_string(), message: "quota".into() }
}
