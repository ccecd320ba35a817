//! Web server exposing the question-answering pipeline.
//!
//! Endpoints:
//! - `GET /`: service info
//! - `GET /health`: status plus available documents and modes
//! - `POST /ask`: answer a question about a document
//! - `GET /pdfs`: list the document registry
//! - `GET /inspect/:pdf_name`: page-level extraction diagnostics

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm;
use crate::pipeline::QaPipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub pipeline: Arc<QaPipeline>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let model = llm::build_client(&settings.llm)?;
        Ok(Self {
            settings: Arc::new(settings),
            pipeline: Arc::new(QaPipeline::new(model)),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let state = AppState::new(settings)?;
    let app = create_router(state);

    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tempfile::tempdir;
    use tower::ServiceExt;

    use crate::llm::LlmProvider;

    fn setup_test_app() -> (axum::Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut settings = Settings::base_default();
        settings.pdf_dir = dir.path().to_path_buf();
        settings.llm = settings.llm.with_provider(LlmProvider::Mock);

        let state = AppState::new(settings).unwrap();
        let app = create_router(state);
        (app, dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn ask_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_lists_registry() {
        let (app, dir) = setup_test_app();
        std::fs::write(dir.path().join("manual.pdf"), b"%PDF-").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["available_pdfs"][0], "manual");
        assert_eq!(json["extraction_modes"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ask_unknown_document_is_not_found() {
        let (app, _dir) = setup_test_app();

        let response = app
            .oneshot(ask_request(r#"{"question":"What?","pdf":"missing"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_ask_unextractable_document_is_unprocessable() {
        let (app, dir) = setup_test_app();
        std::fs::write(dir.path().join("bogus.pdf"), b"not a pdf at all").unwrap();

        let response = app
            .oneshot(ask_request(r#"{"question":"What?","pdf":"bogus"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_inspect_unknown_name_is_not_found() {
        let (app, dir) = setup_test_app();
        std::fs::write(dir.path().join("manual.pdf"), b"%PDF-").unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/inspect/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["available_pdfs"][0], "manual");
    }

    #[tokio::test]
    async fn test_root_names_endpoints() {
        let (app, _dir) = setup_test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["endpoints"]["ask"], "/ask (POST)");
    }
}
