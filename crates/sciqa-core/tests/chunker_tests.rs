use sciqa_core::chunker::{ChunkSpan, ChunkingConfig, EquationAwareChunker};
use sciqa_core::document::DocumentProcessor;
use sciqa_core::types::Document;
use sciqa_core::traits::EquationDetector;

fn chunker(target: usize, overlap: usize) -> EquationAwareChunker {
    EquationAwareChunker::new(ChunkingConfig { target_chars: target, overlap_chars: overlap, min_fill_ratio: 0.7 })
}

fn strip_overlap(span: &ChunkSpan) -> String {
    if span.overlap_chars == 0 {
        return span.text.clone();
    }
    let body: String = span.text.chars().skip(span.overlap_chars).collect();
    body.strip_prefix('\n').map(str::to_string).unwrap_or(body)
}

fn sample_section() -> String {
    let mut paras = Vec::new();
    for i in 0..40 {
        if i % 7 == 3 {
            paras.push(format!("The balance gives $Q_{i} = m c \\Delta T$ for sample {i}."));
        } else {
            paras.push(format!(
                "Paragraph {i} reports the thermal response of the phase change material under cycling, \
                 with latent heat measured by calorimetry and compared to the reference sample."
            ));
        }
    }
    paras.join("\n")
}

#[test]
fn short_plain_section_is_one_chunk() {
    let section = "  First line of prose.\n\nSecond line of prose.\n   \nThird.  ";
    let chunks = chunker(900, 150).chunk(section);
    assert_eq!(chunks, vec!["First line of prose.\nSecond line of prose.\nThird.".to_string()]);
}

#[test]
fn never_returns_blank_chunks() {
    let c = chunker(60, 20);
    let sample = sample_section();
    for section in ["", "   ", "\n\n\n", " \n \t\n", sample.as_str()] {
        for chunk in c.chunk(section) {
            assert!(!chunk.trim().is_empty(), "blank chunk from {section:?}");
        }
    }
    assert!(c.chunk("").is_empty());
}

#[test]
fn size_overflow_carries_raw_tail() {
    let p1 = "a".repeat(25) + &"b".repeat(5);
    let p2 = "c".repeat(30);
    let p3 = "d".repeat(30);
    let section = [p1.as_str(), p2.as_str(), p3.as_str()].join("\n");

    let spans = chunker(50, 10).chunk_spans(&section);
    assert_eq!(spans.len(), 3);
    assert_eq!(spans[0], ChunkSpan { text: p1.clone(), overlap_chars: 0 });
    // tail of chunk 0 is the last 10 chars of p1
    assert_eq!(spans[1].text, format!("{}{}\n{}", "a".repeat(5), "b".repeat(5), p2));
    assert_eq!(spans[1].overlap_chars, 10);
    // tail of chunk 1 is the last 10 chars of p2
    assert_eq!(spans[2].text, format!("{}\n{}", "c".repeat(10), p3));
    assert_eq!(spans[2].overlap_chars, 10);
}

#[test]
fn equation_past_fill_ratio_flushes_without_overlap() {
    let prose = "x".repeat(75);
    let section = format!("{prose}\ngives $E=mc^2$\nfollow-up text");
    let spans = chunker(100, 20).chunk_spans(&section);

    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].text, format!("{prose}\ngives $E=mc^2$"));
    assert_eq!(spans[1], ChunkSpan { text: "follow-up text".to_string(), overlap_chars: 0 });
}

#[test]
fn equation_below_fill_ratio_does_not_flush() {
    let section = "short intro\n$E=mc^2$\nmore words";
    let chunks = chunker(100, 20).chunk(section);
    assert_eq!(chunks, vec![section.to_string()]);
}

#[test]
fn oversized_paragraph_is_kept_whole() {
    let long = "y".repeat(250);
    let chunks = chunker(100, 20).chunk(&long);
    assert_eq!(chunks, vec![long]);
}

#[test]
fn non_overlap_content_reconstructs_paragraphs() {
    let section = sample_section();
    let expected: Vec<&str> = section.split('\n').collect();
    for (target, overlap) in [(900, 150), (300, 50), (120, 40), (80, 0)] {
        let spans = chunker(target, overlap).chunk_spans(&section);
        assert!(spans.len() > 1, "target={target} should split");
        let rebuilt: Vec<String> = spans.iter().map(strip_overlap).collect();
        assert_eq!(rebuilt.join("\n"), expected.join("\n"), "target={target} overlap={overlap}");
    }
}

struct NeverMath;

impl EquationDetector for NeverMath {
    fn looks_like_equation(&self, _text: &str) -> bool {
        false
    }
}

#[test]
fn detector_is_pluggable() {
    let prose = "x".repeat(75);
    let section = format!("{prose}\n$E=mc^2$\ntail");
    let config = ChunkingConfig { target_chars: 100, overlap_chars: 20, min_fill_ratio: 0.7 };

    let default_chunks = EquationAwareChunker::new(config).chunk(&section);
    assert_eq!(default_chunks.len(), 2);

    let plain = EquationAwareChunker::with_detector(config, NeverMath).chunk(&section);
    assert_eq!(plain, vec![section.clone()]);
}

#[test]
fn processor_chunks_with_the_chunker_it_was_given() {
    let config = ChunkingConfig { target_chars: 100, overlap_chars: 20, min_fill_ratio: 0.7 };
    let pages = vec![format!("{}\n$E=mc^2$\ntail", "x".repeat(75))];
    let doc = Document::from_bytes("e.pdf", pages[0].as_bytes());

    let processor = DocumentProcessor::with_chunker(EquationAwareChunker::with_detector(config, NeverMath));
    assert_eq!(processor.chunker().config(), &config);
    let chunks = processor.chunk_document(&doc, &pages);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content, pages[0]);

    let default = DocumentProcessor::new(config);
    assert_eq!(default.chunker().config().target_chars, 100);
    assert_eq!(default.chunk_document(&doc, &pages).len(), 2);
}
