use tracing::{info, warn};

use sciqa_core::citations::format_citations;
use sciqa_core::error::{Error, Result};
use sciqa_core::traits::Generator;
use sciqa_core::types::Answer;

use crate::prompt::{build_context, build_prompt};
use crate::retriever::Retriever;

/// Returned in place of an answer when the model succeeds without text.
pub const NO_RESPONSE: &str = "(No response generated)";

/// Retrieval, prompt assembly and generation with a single quota fallback.
pub struct AnswerOrchestrator {
    retriever: Retriever,
    generator: Box<dyn Generator>,
    model: String,
    fallback_model: String,
}

impl AnswerOrchestrator {
    pub fn new(retriever: Retriever, generator: Box<dyn Generator>, model: impl Into<String>, fallback_model: impl Into<String>) -> Self {
        Self { retriever, generator, model: model.into(), fallback_model: fallback_model.into() }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn answer(&self, question: &str) -> Result<Answer> {
        self.answer_k(question, self.retriever.top_k())
    }

    pub fn answer_k(&self, question: &str, top_k: usize) -> Result<Answer> {
        let hits = self.retriever.retrieve_k(question, top_k)?;
        let prompt = build_prompt(question, &build_context(&hits));
        let (text, model) = self.generate_with_fallback(&prompt)?;
        info!(model = %model, hits = hits.len(), answer_chars = text.len(), "answered");
        Ok(Answer { text, citations: format_citations(&hits), hits, model })
    }

    /// Primary model first; on `ResourceExhausted` the fallback model is tried
    /// once. Its errors, quota included, are returned as they are. When the
    /// primary already is the fallback model the quota error is returned.
    pub fn generate_with_fallback(&self, prompt: &str) -> Result<(String, String)> {
        let (output, model) = match self.generator.generate(&self.model, prompt) {
            Ok(output) => (output, &self.model),
            Err(Error::ResourceExhausted { model, message }) if self.model != self.fallback_model => {
                warn!(model = %model, fallback = %self.fallback_model, %message, "quota hit, switching to fallback model");
                (self.generator.generate(&self.fallback_model, prompt)?, &self.fallback_model)
            }
            Err(e) => return Err(e),
        };
        let text = output.unwrap_or_else(|| NO_RESPONSE.to_string());
        Ok((text, model.clone()))
    }
}
