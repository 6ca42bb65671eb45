//! Citation list derived from a hit set.

use std::collections::HashSet;

use crate::types::{ChunkMeta, Hit};

/// `[fingerprint] basename(source)`.
pub fn citation_label(meta: &ChunkMeta) -> String {
    format!("[{}] {}", meta.doc_id, meta.source_basename())
}

/// One label per distinct document, in the order documents first appear in
/// `hits`. Hits are not re-sorted, so a nearer hit seen later stays later.
pub fn collect_citations(hits: &[Hit]) -> Vec<String> {
    let mut seen = HashSet::new();
    hits.iter()
        .filter(|h| seen.insert(h.meta.doc_id.as_str()))
        .map(|h| citation_label(&h.meta))
        .collect()
}

pub fn format_citations(hits: &[Hit]) -> String {
    collect_citations(hits).join("\n")
}
