//! Model client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible chat-completions API (OpenAI, Groq, Together...).
    #[default]
    OpenAi,
    /// Azure OpenAI deployment.
    Azure,
    /// In-process mock, for tests and credential-less runs.
    Mock,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "openai" | "groq" | "together" => Some(Self::OpenAi),
            "azure" => Some(Self::Azure),
            "mock" => Some(Self::Mock),
            _ => None,
        }
    }
}

/// Configuration for the model client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which client implementation to build.
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key. Required for real providers, ignored by the mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model name, or deployment name for Azure.
    #[serde(default = "default_model")]
    pub model: String,
    /// Azure API version (unused by other providers).
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_api_version() -> String {
    "2024-02-01".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::base_default().with_env_overrides()
    }
}

impl LlmConfig {
    /// Base default without env overrides.
    pub fn base_default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            api_version: default_api_version(),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "openai" (default), "azure", or "mock"
    /// - `LLM_ENDPOINT` / `AZURE_OPENAI_ENDPOINT`: API endpoint
    /// - `LLM_API_KEY` / `OPENAI_API_KEY` / `AZURE_OPENAI_API_KEY`: API key
    /// - `LLM_MODEL` / `AZURE_OPENAI_DEPLOYMENT`: model or deployment name
    /// - `AZURE_OPENAI_API_VERSION`: Azure API version
    ///
    /// An explicit `LLM_PROVIDER` is authoritative; without one, an Azure
    /// key or endpoint selects the Azure provider.
    pub fn with_env_overrides(mut self) -> Self {
        let explicit_provider = std::env::var("LLM_PROVIDER").ok();
        if let Some(ref val) = explicit_provider {
            if let Some(provider) = LlmProvider::parse(val) {
                self.provider = provider;
            }
        }

        if let Ok(val) = std::env::var("LLM_ENDPOINT") {
            self.endpoint = val;
        } else if let Ok(val) = std::env::var("AZURE_OPENAI_ENDPOINT") {
            self.endpoint = val;
            if explicit_provider.is_none() {
                self.provider = LlmProvider::Azure;
            }
        }

        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.api_key = Some(val);
        } else if let Ok(val) = std::env::var("AZURE_OPENAI_API_KEY") {
            self.api_key = Some(val);
            if explicit_provider.is_none() {
                self.provider = LlmProvider::Azure;
            }
        } else if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.api_key = Some(val);
        }

        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.model = val;
        } else if let Ok(val) = std::env::var("AZURE_OPENAI_DEPLOYMENT") {
            self.model = val;
        }

        if let Ok(val) = std::env::var("AZURE_OPENAI_API_VERSION") {
            self.api_version = val;
        }

        self
    }

    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_defaults() {
        let config = LlmConfig::base_default();
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert_eq!(config.endpoint, "https://api.openai.com");
        assert!(config.api_key.is_none());
        assert_eq!(config.model, "gpt-4");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("openai"), Some(LlmProvider::OpenAi));
        assert_eq!(LlmProvider::parse("AZURE"), Some(LlmProvider::Azure));
        assert_eq!(LlmProvider::parse("mock"), Some(LlmProvider::Mock));
        assert_eq!(LlmProvider::parse("groq"), Some(LlmProvider::OpenAi));
        assert_eq!(LlmProvider::parse("unknown"), None);
    }
}
