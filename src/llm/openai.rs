//! OpenAI-compatible and Azure OpenAI chat-completions client.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionParams, LlmConfig, LlmError, LlmProvider, ModelClient};

/// Chat-completions client over reqwest.
pub struct OpenAiClient {
    config: LlmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Completion URL for the configured provider.
    fn completions_url(&self) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        match self.config.provider {
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, self.config.model, self.config.api_version
            ),
            _ => format!("{}/v1/chat/completions", base),
        }
    }
}

#[async_trait::async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        params: &CompletionParams,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let key = self.config.api_key.as_deref().unwrap_or_default();
        let mut req = self.client.post(self.completions_url()).json(&request);
        req = match self.config.provider {
            LlmProvider::Azure => req.header("api-key", key),
            _ => req.bearer_auth(key),
        };

        let resp = req
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::Parse("response carried no choices".to_string()))?;

        Ok(content.trim().to_string())
    }
}
