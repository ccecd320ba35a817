//! CLI command implementations.

use std::sync::Arc;

use crate::answer::{AnswerFormat, QaResult};
use crate::config::Settings;
use crate::extract::{self, ExtractionMode};
use crate::llm;
use crate::pipeline::QaPipeline;
use crate::server;

/// Start the web server.
pub async fn serve(
    mut settings: Settings,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        settings.host = host;
    }
    if let Some(port) = port {
        settings.port = port;
    }
    server::serve(settings).await
}

/// Ask a question about a document and print the result.
pub async fn ask(
    settings: Settings,
    pdf: &str,
    question: &str,
    mode: ExtractionMode,
    format: AnswerFormat,
) -> anyhow::Result<()> {
    let model = llm::build_client(&settings.llm)?;
    let pipeline = QaPipeline::new(model);

    let path = settings.resolve_pdf(pdf);
    let result = pipeline.answer(&path, question, mode, format).await?;

    match result {
        QaResult::Structured(answer) => {
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        QaResult::RawText { text, degraded } => {
            if degraded {
                eprintln!("note: model output was not valid JSON; showing raw text");
            }
            println!("{}", text);
        }
    }
    Ok(())
}

/// Print a document's extraction summary.
pub async fn inspect(settings: Settings, pdf: &str) -> anyhow::Result<()> {
    // The model client is never called for inspection, so the mock is fine
    // and avoids requiring credentials.
    let pipeline = QaPipeline::new(Arc::new(llm::MockClient::new()));

    let path = settings.resolve_pdf(pdf);
    let inspection = pipeline.inspect(&path).await?;
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}

/// List the document registry.
pub fn pdfs(settings: Settings) -> anyhow::Result<()> {
    let registry = settings.available_pdfs();
    if registry.is_empty() {
        println!("No PDFs found under {}", settings.pdf_dir.display());
        return Ok(());
    }
    for (name, path) in registry {
        let marker = if path.exists() { "" } else { " (missing)" };
        println!("{:<24} {}{}", name, path.display(), marker);
    }
    Ok(())
}

/// Report availability of the external extraction tools.
pub fn check() -> anyhow::Result<()> {
    for (tool, available) in extract::check_tools() {
        let status = if available { "found" } else { "MISSING" };
        println!("{:<12} {}", tool, status);
    }
    Ok(())
}
