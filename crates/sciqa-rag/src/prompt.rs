//! Prompt assembly for grounded answers.

use sciqa_core::types::Hit;

pub const SYSTEM_PROMPT: &str = "You are a domain-specific scientific assistant.
- Use ONLY the provided context to answer.
- Include short IEEE-style inline citations like [doc_id].
- If unsure or missing context, say so briefly.
- Preserve equations exactly as shown (e.g., $E=mc^2$).
";

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// `[doc_id] chunk#3 (d=0.123, paper.pdf)`
pub fn context_header(hit: &Hit) -> String {
    format!(
        "[{}] chunk#{} (d={:.3}, {})",
        hit.meta.doc_id,
        hit.meta.chunk_index,
        hit.distance,
        hit.meta.source_basename()
    )
}

pub fn build_context(hits: &[Hit]) -> String {
    hits.iter()
        .map(|h| format!("{}\n{}", context_header(h), h.content))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

pub fn build_prompt(question: &str, context: &str) -> String {
    format!("{SYSTEM_PROMPT}\n\nQuestion: {question}\n\nContext:\n{context}\n\nAnswer with citations.")
}
