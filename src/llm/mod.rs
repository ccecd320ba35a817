//! Model-calling service abstraction.
//!
//! The pipeline talks to a [`ModelClient`], never to a concrete provider.
//! Implementations are selected by configuration: an OpenAI-compatible or
//! Azure OpenAI endpoint for real answers, or the mock client for tests and
//! credential-less runs.

mod config;
mod mock;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use config::{LlmConfig, LlmProvider};
pub use mock::MockClient;
pub use openai::OpenAiClient;

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
}

/// A service that completes a prompt: given a system message and a user
/// prompt, return text. Safe for concurrent reuse; each call is stateless.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &CompletionParams,
    ) -> Result<String, LlmError>;
}

/// Errors that can occur during model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

/// Build the configured model client.
///
/// The mock client is an explicit provider choice, never a silent fallback:
/// a real provider without an API key is a configuration error.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn ModelClient>, LlmError> {
    match config.provider {
        LlmProvider::Mock => Ok(Arc::new(MockClient::new())),
        LlmProvider::OpenAi | LlmProvider::Azure => {
            if config.api_key.is_none() {
                return Err(LlmError::MissingCredentials(
                    "no API key configured; set LLM_API_KEY (or AZURE_OPENAI_API_KEY), \
                     or select LLM_PROVIDER=mock to run without credentials"
                        .to_string(),
                ));
            }
            Ok(Arc::new(OpenAiClient::new(config.clone())))
        }
    }
}
