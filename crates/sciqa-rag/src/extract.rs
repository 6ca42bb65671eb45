use anyhow::anyhow;

use sciqa_core::traits::TextExtractor;

/// Text layer of a PDF via `pdf-extract`. The whole document comes back as a
/// single page; scanned PDFs without a text layer yield an empty string.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| anyhow!("PDF text extraction failed: {e}"))?;
        Ok(vec![text])
    }
}

/// Treats the bytes as UTF-8 text, one page. Useful for plain-text corpora.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> anyhow::Result<Vec<String>> {
        Ok(vec![String::from_utf8_lossy(bytes).into_owned()])
    }
}
