use std::collections::HashSet;
use std::fs;

use sciqa_core::chunker::ChunkingConfig;
use sciqa_core::citations::{collect_citations, format_citations};
use sciqa_core::document::{list_pdf_files, DocumentProcessor};
use sciqa_core::sections::split_sections;
use sciqa_core::types::{fingerprint, ChunkMeta, Document, Hit, FINGERPRINT_LEN};
use tempfile::TempDir;

#[test]
fn no_heading_gives_single_section() {
    let text = "Some preamble text.\n\nAnother paragraph without any heading.";
    let sections = split_sections(text);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].text, text);
    assert_eq!(sections[0].heading, None);
}

#[test]
fn headings_open_sections() {
    let sections = split_sections("Abstract\n\nfoo\n\nIntroduction\n\nbar");
    let texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["Abstract\n\nfoo", "Introduction\n\nbar"]);
    assert_eq!(sections[0].heading.as_deref(), Some("abstract"));
    assert_eq!(sections[1].heading.as_deref(), Some("introduction"));
}

#[test]
fn heading_match_is_case_insensitive_and_word_bounded() {
    let text = "Title page\n\n  METHODS and setup\n\nMethodology is not a heading\n\nresults: good\n\nReferences\n\n[1] A. Author";
    let sections = split_sections(text);
    let headings: Vec<Option<&str>> = sections.iter().map(|s| s.heading.as_deref()).collect();
    assert_eq!(headings, vec![None, Some("methods"), Some("results"), Some("references")]);
    assert_eq!(sections[1].text, "  METHODS and setup\n\nMethodology is not a heading");
    // trailing content after the last heading still forms a section
    assert_eq!(sections[3].text, "References\n\n[1] A. Author");
}

#[test]
fn blank_text_has_no_sections() {
    assert!(split_sections("").is_empty());
    assert!(split_sections(" \n\n \n").is_empty());
}

#[test]
fn fingerprint_is_deterministic() {
    let bytes = b"%PDF-1.7 fake paper bytes";
    let a = Document::from_bytes("papers/a.pdf", bytes);
    let b = Document::from_bytes("elsewhere/copy.pdf", bytes);
    assert_eq!(a.id, b.id);
    assert_eq!(a.id.len(), FINGERPRINT_LEN);
    assert_ne!(a.id, fingerprint(b"different bytes"));
}

#[test]
fn document_chunks_are_numbered_across_sections() {
    let pages = vec![
        "Abstract\n\nWe study ther-\nmal storage.\n\nIntroduction\n\nPhase change materials store heat.".to_string(),
        "Results\n\nThe latent heat is $L = 200$ kJ/kg.\n\nConclusion\n\nIt works.".to_string(),
    ];
    let doc = Document::from_bytes("/data/papers/pcm.pdf", b"pcm");
    let processor = DocumentProcessor::new(ChunkingConfig::default());
    let chunks = processor.chunk_document(&doc, &pages);

    assert_eq!(chunks.len(), 4);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.chunk_index, i);
        assert_eq!(c.total_chunks, 4);
        assert_eq!(c.id, format!("{}_{}", doc.id, i));
        assert_eq!(c.doc_path, "/data/papers/pcm.pdf");
        assert!(!c.content.trim().is_empty());
    }
    assert_eq!(chunks[0].content, "Abstract\nWe study thermal storage.");
    let sections: Vec<Option<&str>> = chunks.iter().map(|c| c.section.as_deref()).collect();
    assert_eq!(sections, vec![Some("abstract"), Some("introduction"), Some("results"), Some("conclusion")]);
}

#[test]
fn empty_pages_give_no_chunks() {
    let doc = Document::from_bytes("scan.pdf", b"scan");
    let processor = DocumentProcessor::default();
    assert!(processor.chunk_document(&doc, &[String::new(), "  ".to_string()]).is_empty());
}

#[test]
fn lists_pdfs_sorted() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("b.pdf"), b"b").unwrap();
    fs::write(dir.join("a.PDF"), b"a").unwrap();
    fs::write(dir.join("sub/c.pdf"), b"c").unwrap();
    fs::write(dir.join("notes.txt"), b"n").unwrap();

    let files = list_pdf_files(dir);
    let names: Vec<String> = files.iter().map(|p| p.strip_prefix(dir).unwrap().display().to_string()).collect();
    assert_eq!(names, vec!["a.PDF", "b.pdf", "sub/c.pdf"]);
}

fn hit(doc_id: &str, chunk_index: usize, source: &str, distance: f32) -> Hit {
    Hit {
        content: format!("chunk {chunk_index} of {doc_id}"),
        meta: ChunkMeta { doc_id: doc_id.to_string(), chunk_index, source: source.to_string(), section: None },
        distance,
    }
}

#[test]
fn citations_dedupe_by_document() {
    let hits = vec![hit("aaa111", 0, "/p/one.pdf", 0.1), hit("aaa111", 4, "/p/one.pdf", 0.2)];
    assert_eq!(format_citations(&hits), "[aaa111] one.pdf");
}

#[test]
fn citations_keep_first_seen_order() {
    let hits = vec![
        hit("zzz999", 2, "/p/zeta.pdf", 0.30),
        hit("aaa111", 0, "/p/alpha.pdf", 0.05),
        hit("zzz999", 3, "/p/zeta.pdf", 0.01),
    ];
    assert_eq!(collect_citations(&hits), vec!["[zzz999] zeta.pdf", "[aaa111] alpha.pdf"]);
    let distinct: HashSet<&str> = hits.iter().map(|h| h.meta.doc_id.as_str()).collect();
    assert_eq!(format_citations(&hits).lines().count(), distinct.len());
}

#[test]
fn citations_of_nothing_is_empty() {
    assert_eq!(format_citations(&[]), "");
}
