use crate::error::{AdvisoryError, Result};

/// Configuration for the LLM-backed recommendation requester.
#[derive(Debug, Clone)]
pub struct RecommendationConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl RecommendationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| AdvisoryError::Config("OPENROUTER_API_KEY not set".into()))?;

        let model = std::env::var("LLM_MODEL")
            .unwrap_or_else(|_| "google/gemini-2.0-flash-001".into());

        let api_base_url = std::env::var("LLM_API_BASE_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1".into());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.2);

        let max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2048);

        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            api_key,
            model,
            api_base_url,
            temperature,
            max_tokens,
            timeout_secs,
        })
    }

    /// Create a config builder, mainly for testing.
    pub fn builder(api_key: impl Into<String>) -> RecommendationConfigBuilder {
        RecommendationConfigBuilder {
            api_key: api_key.into(),
            model: "google/gemini-2.0-flash-001".into(),
            api_base_url: "https://openrouter.ai/api/v1".into(),
            temperature: 0.2,
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

/// Builder for constructing `RecommendationConfig` in tests.
pub struct RecommendationConfigBuilder {
    api_key: String,
    model: String,
    api_base_url: String,
    temperature: f64,
    max_tokens: u32,
    timeout_secs: u64,
}

impl RecommendationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn build(self) -> RecommendationConfig {
        RecommendationConfig {
            api_key: self.api_key,
            model: self.model,
            api_base_url: self.api_base_url,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_secs: self.timeout_secs,
        }
    }
}
