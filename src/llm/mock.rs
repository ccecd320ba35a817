//! In-process mock model client.
//!
//! An explicit provider choice (`LLM_PROVIDER=mock`), not a runtime
//! fallback. Returns a fixed, schema-conforming answer so the rest of the
//! pipeline can be exercised without credentials.

use super::{CompletionParams, LlmError, ModelClient};

const MOCK_RESPONSE: &str = r#"{"answer": "Mock response - configure model credentials for real answers", "language": "en", "citations": [], "confidence": 0.5}"#;

/// Model client that answers every prompt with a canned response.
pub struct MockClient {
    response: String,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            response: MOCK_RESPONSE.to_string(),
        }
    }

    /// Answer with a caller-supplied response instead of the canned one.
    pub fn with_response(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ModelClient for MockClient {
    async fn complete(
        &self,
        _system: &str,
        _user: &str,
        _params: &CompletionParams,
    ) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}
