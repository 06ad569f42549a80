//! Text extraction for uploaded résumé files.
//! PDFs go through pdf-extract; everything else is treated as text and cleaned.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

const PDF_CONTENT_TYPE: &str = "application/pdf";

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("Invalid regex: blank line run"));

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Carries the underlying pdf-extract message for logs.
    #[error("Failed to parse PDF file")]
    Pdf(String),

    #[error("Could not extract text from file")]
    Empty,
}

/// Extracts plain text from an uploaded file.
///
/// A file is a PDF when its content type says so or its name ends in `.pdf`.
pub fn extract_text(
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<String, ExtractError> {
    let text = if is_pdf(file_name, content_type) {
        extract_pdf_text(data)?
    } else {
        clean_plain_text(&String::from_utf8_lossy(data))
    };

    if text.is_empty() {
        warn!("No text extracted from {file_name}");
        return Err(ExtractError::Empty);
    }

    info!("Extracted {} characters from {file_name}", text.len());
    Ok(text)
}

fn is_pdf(file_name: &str, content_type: Option<&str>) -> bool {
    content_type == Some(PDF_CONTENT_TYPE) || file_name.to_ascii_lowercase().ends_with(".pdf")
}

fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractError> {
    match pdf_extract::extract_text_from_mem(data) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) => {
            warn!("PDF extraction failed: {e}");
            Err(ExtractError::Pdf(e.to_string()))
        }
    }
}

/// Normalizes line endings, drops anything outside printable ASCII and newlines,
/// then collapses runs of blank lines to one.
pub fn clean_plain_text(content: &str) -> String {
    let printable: String = content
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| c == '\n' || (' '..='~').contains(&c))
        .collect();

    EXCESS_BLANK_LINES
        .replace_all(&printable, "\n\n")
        .trim()
        .to_string()
}
