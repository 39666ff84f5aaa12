//! Plain-text extraction from uploaded résumés.
//!
//! Dispatch is purely on the lower-cased file extension. Decoding is CPU-bound
//! and runs inside `tokio::task::spawn_blocking`.

use std::path::Path;

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" | "docx" => Some(DocumentKind::Word),
            _ => None,
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<String, ExtractError> {
        match self {
            DocumentKind::Pdf => pdf_text(bytes),
            DocumentKind::Word => word_text(bytes),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF decode error: {0}")]
    Pdf(String),

    #[error("Word decode error: {0}")]
    Word(String),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Extracts the text of the file at `path`, choosing the decoder from
/// `filename`. Every failure is logged and reported as `None`.
pub async fn extract_text(path: &Path, filename: &str) -> Option<String> {
    match try_extract(path, filename).await {
        Ok(text) => {
            info!("Extracted {} characters from {filename}", text.len());
            Some(text)
        }
        Err(e) => {
            error!("Failed to extract text from {filename}: {e}");
            None
        }
    }
}

async fn try_extract(path: &Path, filename: &str) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_filename(filename).ok_or_else(|| {
        let ext = Path::new(filename)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        ExtractError::Unsupported(ext)
    })?;

    let bytes = tokio::fs::read(path).await?;
    tokio::task::spawn_blocking(move || kind.decode(&bytes)).await?
}

/// Decodes a PDF page by page and joins the pages with newlines.
pub fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(join_pages(&pages))
}

/// Trims each page, joins them with `\n` and trims the whole.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Decodes a Word (OOXML) document body into one line per paragraph.
pub fn word_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Word(e.to_string()))?;

    let lines: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        })
        .collect();

    Ok(lines.join("\n").trim().to_string())
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}


#[cfg(test)]
mod tests {
    use super::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_filename("a.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("a.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("a.doc"), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_filename("a.DOCX"), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_filename("a.txt"), None);
        assert_eq!(DocumentKind::from_filename("pdf"), None);
    }

    #[test]
    fn test_join_pages_trims_and_separates() {
        let pages = vec![
            "  Jane Doe \n".to_string(),
            "Experience".to_string(),
            "\nEducation\n\n".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Jane Doe\nExperience\nEducation");
    }

    #[test]
    fn test_join_pages_empty_document() {
        assert_eq!(join_pages(&[]), "");
        assert_eq!(join_pages(&["  ".to_string(), "\n".to_string()]), "");
    }

    #[test]
    fn test_pdf_pages_in_order() {
        let bytes = pdf_with_pages(&["Jane Doe", "Experience", "Education"]);

        let text = pdf_text(&bytes).unwrap();

        assert_eq!(text, "Jane Doe\nExperience\nEducation");
    }

    #[test]
    fn test_pdf_garbage_is_an_error() {
        assert!(pdf_text(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let bytes = docx_with_paragraphs(&["Jane Doe", "Rust Engineer", "Berlin"]);

        let text = word_text(&bytes).unwrap();

        assert_eq!(text, "Jane Doe\nRust Engineer\nBerlin");
    }

    #[test]
    fn test_legacy_doc_bytes_fail() {
        // OLE compound file signature, not a zip container
        let bytes = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0, 0, 0];
        assert!(word_text(&bytes).is_err());
    }

    #[tokio::test]
    async fn test_extract_text_dispatches_on_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, docx_with_paragraphs(&["Hello"])).unwrap();

        assert_eq!(
            extract_text(&path, "Resume.DOCX").await.as_deref(),
            Some("Hello")
        );
        assert_eq!(extract_text(&path, "resume.txt").await, None);
    }

    #[tokio::test]
    async fn test_extract_text_decode_failure_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 truncated").unwrap();

        assert_eq!(extract_text(&path, "broken.pdf").await, None);
    }

    #[tokio::test]
    async fn test_extract_text_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            extract_text(&dir.path().join("gone.pdf"), "gone.pdf").await,
            None
        );
    }
}
