//! Heading-driven segmentation of normalized paper text.

use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(abstract|introduction|methods?|materials?|results?|discussion|conclusion|references)\b",
    )
    .expect("valid heading regex")
});

/// Paragraph separator in normalized text and in section output.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// A run of paragraphs under one heading. `heading` is the lower-cased
/// keyword that opened it, `None` for text before the first heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: Option<String>,
    pub text: String,
}

/// Lower-cased heading keyword when `paragraph` opens a section.
pub fn heading_of(paragraph: &str) -> Option<String> {
    HEADING
        .captures(paragraph.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Split text on blank lines and group paragraphs into sections. Text with no
/// heading comes back as a single section equal to the input; whitespace-only
/// input yields no sections.
pub fn split_sections(text: &str) -> Vec<Section> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut sections = Vec::new();
    let mut heading: Option<String> = None;
    let mut current: Vec<&str> = Vec::new();

    for para in text.split(PARAGRAPH_BREAK) {
        if let Some(next) = heading_of(para) {
            flush(&mut sections, heading.take(), &mut current);
            heading = Some(next);
        }
        current.push(para);
    }
    flush(&mut sections, heading, &mut current);
    sections
}

fn flush(sections: &mut Vec<Section>, heading: Option<String>, current: &mut Vec<&str>) {
    if current.is_empty() {
        return;
    }
    let text = current.join(PARAGRAPH_BREAK);
    current.clear();
    // a preamble of blank paragraphs carries nothing worth chunking
    if heading.is_none() && text.trim().is_empty() {
        return;
    }
    sections.push(Section { heading, text });
}
