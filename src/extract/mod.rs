//! Per-page text extraction from PDF documents.
//!
//! Extracts text using:
//! - pdftotext (Poppler) for the embedded text layer and positional blocks
//! - pdftoppm (Poppler) for page rasterization
//! - Tesseract OCR for pages with no usable text layer
//!
//! Every mode yields one entry per source page; a page that defeats every
//! fallback still produces an empty-text entry. An unreadable document (or
//! missing tooling) yields an empty sequence, which callers treat as the
//! extraction-failed signal.

mod extractor;
mod tesseract;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extractor::{plan, PageExtractor, PageStrategy};
pub use tesseract::TesseractOcr;

/// Policy governing whether and how OCR is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Embedded text only, with a positional-blocks fallback. No OCR.
    DirectOnly,
    /// Embedded text first, OCR for pages with too little of it.
    #[default]
    OcrPrimary,
    /// Rasterize every page and OCR it, ignoring the text layer.
    ImageRenderOcr,
}

/// Method that produced a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMethod {
    /// Embedded text layer.
    Embedded,
    /// Tesseract OCR over a rasterized page.
    Ocr,
    /// Positional text blocks in content-stream order.
    Blocks,
}

/// One page of a source document.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based page number.
    pub number: u32,
    /// Extracted text, trimmed. May be empty.
    pub text: String,
    /// Method that produced the text.
    pub method: PageMethod,
}

/// Errors internal to the extraction tooling. These never cross the
/// `PageExtractor::extract` boundary; they drive per-page fallbacks.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("external tool not found: {0}")]
    ToolNotFound(String),

    #[error("extraction failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, extracting stdout on success or returning the
/// appropriate error.
pub(crate) fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractError::Failed(format!("{}: {}", error_prefix, stderr)))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractError::Io(e)),
    }
}

/// Check command status, returning the appropriate error on failure.
pub(crate) fn check_cmd_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool_name: &str,
    error_msg: &str,
) -> Result<(), ExtractError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(ExtractError::Failed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractError::Io(e)),
    }
}

/// Report availability of the external tools the extractor depends on.
pub fn check_tools() -> Vec<(String, bool)> {
    ["pdftotext", "pdftoppm", "pdfinfo", "tesseract"]
        .iter()
        .map(|tool| (tool.to_string(), which::which(tool).is_ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools_lists_all() {
        let tools = check_tools();
        assert_eq!(tools.len(), 4);
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&ExtractionMode::ImageRenderOcr).unwrap();
        assert_eq!(json, "\"image-render-ocr\"");
        let mode: ExtractionMode = serde_json::from_str("\"direct-only\"").unwrap();
        assert_eq!(mode, ExtractionMode::DirectOnly);
    }
}
