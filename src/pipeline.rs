//! The document-to-answer pipeline.
//!
//! Sequences extraction, prompt assembly, the model call, and answer
//! interpretation. Every exit path is a discriminated result; nothing
//! propagates past this boundary as a panic. Extraction runs on a blocking
//! task and the whole sequence sits under a wall-clock timeout, so a stuck
//! operation is abandoned rather than held.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::answer::{interpret, AnswerFormat, QaResult};
use crate::extract::{ExtractionMode, Page, PageExtractor};
use crate::llm::{CompletionParams, ModelClient};
use crate::prompt;

/// Wall-clock budget for a question-answering run.
pub const ANSWER_TIMEOUT: Duration = Duration::from_secs(60);

/// Wall-clock budget for an inspection-only extraction.
pub const INSPECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generation parameters biased toward deterministic, concise answers.
const COMPLETION_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.1,
    max_tokens: 1000,
};

/// Number of pages included in an inspection preview.
const PREVIEW_PAGES: usize = 3;

/// Maximum characters per page preview.
const PREVIEW_CHARS: usize = 300;

/// Failures the pipeline can report.
#[derive(Debug, Error)]
pub enum QaError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("could not extract any text from {}", .0.display())]
    ExtractionFailed(PathBuf),

    #[error("model call failed: {0}")]
    ModelCall(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("processing error: {0}")]
    Internal(String),
}

/// Summary of a document's extractable content, for diagnostics.
#[derive(Debug, Serialize)]
pub struct DocumentInspection {
    pub filename: String,
    pub total_pages: usize,
    pub total_characters: usize,
    pub preview_pages: Vec<PagePreview>,
}

#[derive(Debug, Serialize)]
pub struct PagePreview {
    pub page_number: u32,
    pub character_count: usize,
    pub preview: String,
}

/// Orchestrates the document-to-answer pipeline.
pub struct QaPipeline {
    extractor: Arc<PageExtractor>,
    model: Arc<dyn ModelClient>,
    max_prompt_chars: usize,
    answer_timeout: Duration,
    inspect_timeout: Duration,
}

impl QaPipeline {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            extractor: Arc::new(PageExtractor::new()),
            model,
            max_prompt_chars: prompt::DEFAULT_MAX_CHARS,
            answer_timeout: ANSWER_TIMEOUT,
            inspect_timeout: INSPECT_TIMEOUT,
        }
    }

    pub fn with_extractor(mut self, extractor: PageExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_max_prompt_chars(mut self, max_chars: usize) -> Self {
        self.max_prompt_chars = max_chars;
        self
    }

    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = timeout;
        self
    }

    pub fn with_inspect_timeout(mut self, timeout: Duration) -> Self {
        self.inspect_timeout = timeout;
        self
    }

    /// Answer a question about a document.
    pub async fn answer(
        &self,
        path: &Path,
        question: &str,
        mode: ExtractionMode,
        format: AnswerFormat,
    ) -> Result<QaResult, QaError> {
        let timeout = self.answer_timeout;
        tokio::time::timeout(timeout, self.run_answer(path, question, mode, format))
            .await
            .map_err(|_| QaError::Timeout(timeout))?
    }

    /// Extract and summarize a document's pages for diagnostics.
    pub async fn inspect(&self, path: &Path) -> Result<DocumentInspection, QaError> {
        let timeout = self.inspect_timeout;
        tokio::time::timeout(timeout, self.run_inspect(path))
            .await
            .map_err(|_| QaError::Timeout(timeout))?
    }

    async fn run_answer(
        &self,
        path: &Path,
        question: &str,
        mode: ExtractionMode,
        format: AnswerFormat,
    ) -> Result<QaResult, QaError> {
        let pages = self.extract_pages(path, mode).await?;

        tracing::info!(
            "extracted {} pages from {}, assembling prompt",
            pages.len(),
            path.display()
        );

        let label = path.to_string_lossy();
        let block =
            prompt::build_paged_block(&[(label.as_ref(), pages.as_slice())], self.max_prompt_chars);
        let user_prompt = prompt::build_prompt(&block, question);

        let system = match format {
            AnswerFormat::Structured => prompt::SYSTEM_STRUCTURED,
            AnswerFormat::FreeText => prompt::SYSTEM_FREE_TEXT,
        };

        let raw = self
            .model
            .complete(system, &user_prompt, &COMPLETION_PARAMS)
            .await
            .map_err(|e| QaError::ModelCall(e.to_string()))?;

        Ok(interpret(&raw, format))
    }

    async fn run_inspect(&self, path: &Path) -> Result<DocumentInspection, QaError> {
        let pages = self.extract_pages(path, ExtractionMode::OcrPrimary).await?;

        let preview_pages = pages
            .iter()
            .take(PREVIEW_PAGES)
            .map(|page| PagePreview {
                page_number: page.number,
                character_count: page.text.len(),
                preview: preview_of(&page.text),
            })
            .collect();

        Ok(DocumentInspection {
            filename: filename_of(path),
            total_pages: pages.len(),
            total_characters: pages.iter().map(|p| p.text.len()).sum(),
            preview_pages,
        })
    }

    /// Check existence, then run extraction on a blocking task. An empty
    /// page sequence is the extraction-failed signal, distinct from
    /// not-found.
    async fn extract_pages(
        &self,
        path: &Path,
        mode: ExtractionMode,
    ) -> Result<Vec<Page>, QaError> {
        if !path.exists() {
            return Err(QaError::DocumentNotFound(path.to_path_buf()));
        }

        let extractor = Arc::clone(&self.extractor);
        let owned_path = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || extractor.extract(&owned_path, mode))
            .await
            .map_err(|e| QaError::Internal(e.to_string()))?;

        if pages.is_empty() {
            return Err(QaError::ExtractionFailed(path.to_path_buf()));
        }
        Ok(pages)
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// First `PREVIEW_CHARS` characters of a page, with an ellipsis when cut.
fn preview_of(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockClient;

    fn mock_pipeline() -> QaPipeline {
        QaPipeline::new(Arc::new(MockClient::new()))
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let result = mock_pipeline()
            .answer(
                Path::new("/nonexistent/missing.pdf"),
                "What is this?",
                ExtractionMode::OcrPrimary,
                AnswerFormat::Structured,
            )
            .await;
        assert!(matches!(result, Err(QaError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn test_unextractable_document_is_extraction_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.pdf");
        std::fs::write(&bogus, b"not a pdf at all").unwrap();

        let result = mock_pipeline()
            .answer(
                &bogus,
                "What is this?",
                ExtractionMode::OcrPrimary,
                AnswerFormat::Structured,
            )
            .await;
        assert!(matches!(result, Err(QaError::ExtractionFailed(_))));
    }

    #[tokio::test]
    async fn test_inspect_missing_document_is_not_found() {
        let result = mock_pipeline()
            .inspect(Path::new("/nonexistent/missing.pdf"))
            .await;
        assert!(matches!(result, Err(QaError::DocumentNotFound(_))));
    }

    #[tokio::test]
    async fn test_exhausted_budget_reports_timeout() {
        let dir = tempfile::TempDir::new().unwrap();
        let bogus = dir.path().join("slow.pdf");
        std::fs::write(&bogus, b"not a pdf").unwrap();

        let pipeline = mock_pipeline().with_answer_timeout(Duration::ZERO);
        let result = pipeline
            .answer(
                &bogus,
                "question",
                ExtractionMode::DirectOnly,
                AnswerFormat::Structured,
            )
            .await;
        assert!(matches!(result, Err(QaError::Timeout(_))));
    }

    #[test]
    fn test_preview_truncates_with_ellipsis() {
        let short = "short page";
        assert_eq!(preview_of(short), short);

        let long = "y".repeat(400);
        let preview = preview_of(&long);
        assert_eq!(preview.chars().count(), 303);
        assert!(preview.ends_with("..."));
    }
}
