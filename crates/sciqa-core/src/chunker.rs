//! Equation-aware chunking of a single section.
//!
//! Greedy and single pass: paragraphs accumulate until the next one would
//! overflow `target_chars`, at which point the buffer becomes a chunk and the
//! next buffer starts with the raw character tail of that chunk. Once a buffer
//! is past `min_fill_ratio` of the target, a paragraph that looks like an
//! equation closes the chunk right after itself and no overlap is carried.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::traits::EquationDetector;

pub const DEFAULT_TARGET_CHARS: usize = 900;
pub const DEFAULT_OVERLAP_CHARS: usize = 150;
pub const DEFAULT_MIN_FILL_RATIO: f64 = 0.7;

static EQUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$.*?\$|=+|[A-Za-z]\^\{?\d+\}?").expect("valid equation regex")
});

/// Default detector: a `$…$` span, any `=`, or `x^2` / `x^{2}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicEquationDetector;

impl EquationDetector for HeuristicEquationDetector {
    fn looks_like_equation(&self, text: &str) -> bool {
        EQUATION.is_match(text)
    }
}

/// Sizes are counted in chars, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub target_chars: usize,
    pub overlap_chars: usize,
    pub min_fill_ratio: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chars: DEFAULT_TARGET_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
            min_fill_ratio: DEFAULT_MIN_FILL_RATIO,
        }
    }
}

/// A chunk and the number of leading chars copied from the previous chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    pub text: String,
    pub overlap_chars: usize,
}

pub struct EquationAwareChunker<D = HeuristicEquationDetector> {
    config: ChunkingConfig,
    detector: D,
}

impl EquationAwareChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config, detector: HeuristicEquationDetector }
    }
}

impl Default for EquationAwareChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

impl<D: EquationDetector> EquationAwareChunker<D> {
    pub fn with_detector(config: ChunkingConfig, detector: D) -> Self {
        Self { config, detector }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk texts only; callers that need overlap bookkeeping use
    /// [`chunk_spans`](Self::chunk_spans).
    pub fn chunk(&self, section: &str) -> Vec<String> {
        self.chunk_spans(section).into_iter().map(|s| s.text).collect()
    }

    pub fn chunk_spans(&self, section: &str) -> Vec<ChunkSpan> {
        let target = self.config.target_chars;
        let early_flush_at = target as f64 * self.config.min_fill_ratio;

        let mut spans = Vec::new();
        let mut buffer: Vec<String> = Vec::new();
        let mut size = 0usize;
        let mut carried = 0usize;

        // single newlines separate paragraphs here; blank-line grouping is flattened
        for para in section.split('\n').map(str::trim).filter(|p| !p.is_empty()) {
            let para_len = para.chars().count();

            if size + para_len > target && !buffer.is_empty() {
                let text = buffer.join("\n");
                let tail = char_tail(&text, self.config.overlap_chars).to_string();
                spans.push(ChunkSpan { text, overlap_chars: carried });
                size = tail.chars().count();
                carried = size;
                buffer.clear();
                if !tail.is_empty() {
                    buffer.push(tail);
                }
            }

            buffer.push(para.to_string());
            size += para_len;

            if self.detector.looks_like_equation(para) && size as f64 > early_flush_at {
                spans.push(ChunkSpan { text: buffer.join("\n"), overlap_chars: carried });
                buffer.clear();
                size = 0;
                carried = 0;
            }
        }

        if !buffer.is_empty() {
            spans.push(ChunkSpan { text: buffer.join("\n"), overlap_chars: carried });
        }
        spans.retain(|s| !s.text.trim().is_empty());
        spans
    }
}

/// The last `n` chars of `text` (all of it when shorter).
fn char_tail(text: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match text.char_indices().rev().nth(n - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_tail_counts_chars_not_bytes() {
        assert_eq!(char_tail("abcdef", 3), "def");
        assert_eq!(char_tail("αβγδ", 2), "γδ");
        assert_eq!(char_tail("ab", 5), "ab");
        assert_eq!(char_tail("ab", 0), "");
    }

    #[test]
    fn heuristic_detector() {
        let d = HeuristicEquationDetector;
        assert!(d.looks_like_equation("we find $E=mc^2$ here"));
        assert!(d.looks_like_equation("x = y + 1"));
        assert!(d.looks_like_equation("area grows as r^2"));
        assert!(d.looks_like_equation("area grows as r^{2}"));
        assert!(!d.looks_like_equation("plain prose, no math at all"));
        assert!(!d.looks_like_equation("costs $5 per unit"));
    }
}
