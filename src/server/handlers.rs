//! Request handlers for the web server.

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::answer::{AnswerFormat, Citation, QaResult};
use crate::extract::ExtractionMode;
use crate::pipeline::{DocumentInspection, QaError};

use super::AppState;

/// Question request body.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Registry name or a literal path.
    pub pdf: String,
    #[serde(default)]
    pub extraction_mode: ExtractionMode,
    #[serde(default)]
    pub format: AnswerFormat,
}

/// Question response body. Structured answers populate the citation fields;
/// raw-text results set `format` to "raw_text" (degraded) or "free_text".
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub success: bool,
    pub pdf: String,
    pub question: String,
    pub extraction_mode: ExtractionMode,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub available_pdfs: Vec<String>,
    pub extraction_modes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PdfInfo {
    pub path: String,
    pub exists: bool,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct PdfListResponse {
    pub available_pdfs: std::collections::BTreeMap<String, PdfInfo>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub pdf_name: String,
    #[serde(flatten)]
    pub inspection: DocumentInspection,
}

/// Pipeline failure mapped to an HTTP response.
pub struct ApiError(QaError);

impl From<QaError> for ApiError {
    fn from(err: QaError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            QaError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            QaError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            QaError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            QaError::ModelCall(_) => StatusCode::BAD_GATEWAY,
            QaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "success": false,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Root endpoint with service information.
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "PDF Question Answering API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "ask": "/ask (POST)",
            "pdfs": "/pdfs",
            "inspect": "/inspect/{pdf_name}"
        }
    }))
}

/// Health check with available documents and extraction modes.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        message: "PDF QA service is running",
        available_pdfs: state.settings.available_pdfs().into_keys().collect(),
        extraction_modes: vec!["direct-only", "ocr-primary", "image-render-ocr"],
    })
}

/// Answer a question about a document.
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let path = state.settings.resolve_pdf(&request.pdf);
    tracing::info!("question about {}: {}", path.display(), request.question);

    let result = state
        .pipeline
        .answer(&path, &request.question, request.extraction_mode, request.format)
        .await?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| request.pdf.clone());

    let response = match result {
        QaResult::Structured(answer) => AskResponse {
            success: true,
            pdf: filename,
            question: request.question,
            extraction_mode: request.extraction_mode,
            answer: answer.answer,
            confidence: Some(answer.confidence),
            language: Some(answer.language),
            citations: Some(answer.citations),
            format: None,
        },
        QaResult::RawText { text, degraded } => AskResponse {
            success: true,
            pdf: filename,
            question: request.question,
            extraction_mode: request.extraction_mode,
            answer: text,
            confidence: None,
            language: None,
            citations: None,
            format: Some(if degraded { "raw_text" } else { "free_text" }),
        },
    };

    Ok(Json(response))
}

/// List the document registry.
pub async fn list_pdfs(State(state): State<AppState>) -> impl IntoResponse {
    let available_pdfs: std::collections::BTreeMap<String, PdfInfo> = state
        .settings
        .available_pdfs()
        .into_iter()
        .map(|(name, path)| {
            let info = PdfInfo {
                exists: path.exists(),
                filename: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: path.to_string_lossy().into_owned(),
            };
            (name, info)
        })
        .collect();

    let total_count = available_pdfs.len();
    Json(PdfListResponse {
        available_pdfs,
        total_count,
    })
}

/// Inspect a registered document's extractable content.
pub async fn inspect_pdf(
    State(state): State<AppState>,
    UrlPath(pdf_name): UrlPath<String>,
) -> Result<Json<InspectResponse>, Response> {
    let registry = state.settings.available_pdfs();
    let Some(path) = registry.get(&pdf_name) else {
        let body = Json(serde_json::json!({
            "success": false,
            "error": format!("PDF '{}' not found", pdf_name),
            "available_pdfs": registry.keys().collect::<Vec<_>>(),
        }));
        return Err((StatusCode::NOT_FOUND, body).into_response());
    };

    let inspection = state
        .pipeline
        .inspect(path)
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    Ok(Json(InspectResponse {
        pdf_name,
        inspection,
    }))
}
