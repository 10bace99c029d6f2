use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AdvisoryError, Result};
use crate::recommendation::Message;

/// A model listed by the OpenRouter models endpoint (simplified).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRouterModel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_base_url: String,
    pub auth_base_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://openrouter.ai/api/v1".into(),
            auth_base_url: "https://openrouter.ai/auth".into(),
            timeout_secs: 30,
        }
    }
}

impl OpenRouterConfig {
    /// Load configuration from environment variables, falling back to the
    /// public OpenRouter endpoints.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("OPENROUTER_API_BASE_URL")
                .unwrap_or(defaults.api_base_url),
            auth_base_url: std::env::var("OPENROUTER_AUTH_BASE_URL")
                .unwrap_or(defaults.auth_base_url),
            timeout_secs: std::env::var("OPENROUTER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_auth_base_url(mut self, auth_base_url: impl Into<String>) -> Self {
        self.auth_base_url = auth_base_url.into();
        self
    }
}

/// Client for the OpenRouter key-exchange and account endpoints.
///
/// Covers the PKCE code-for-key exchange plus the bearer-authenticated
/// models and chat-completions endpoints used by the admin panel.
pub struct OpenRouterAuth {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

#[derive(Serialize)]
struct ExchangeRequest<'a> {
    code: &'a str,
    code_verifier: &'a str,
    code_challenge_method: &'static str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    key: String,
}

#[derive(Deserialize)]
struct ExchangeErrorResponse {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModelsResponse {
    Wrapped { data: Vec<OpenRouterModel> },
    Bare(Vec<OpenRouterModel>),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenRouterAuth {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AdvisoryError::LlmApiRequest)?;

        Ok(Self { http, config })
    }

    /// Build the authorization redirect URL carrying the S256 challenge.
    /// The plaintext verifier never appears here.
    pub fn authorization_url(&self, callback_url: &str, code_challenge: &str) -> String {
        format!(
            "{}?callback_url={}&code_challenge={}&code_challenge_method=S256",
            self.config.auth_base_url,
            urlencoding::encode(callback_url),
            urlencoding::encode(code_challenge),
        )
    }

    /// Exchange an authorization code and the held verifier for an API key.
    ///
    /// The verifier is transmitted only here, in the token exchange body.
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<String> {
        let url = format!("{}/auth/keys", self.config.api_base_url);

        let body = ExchangeRequest {
            code,
            code_verifier,
            code_challenge_method: "S256",
        };

        let resp = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::OAuth(format!("token exchange request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ExchangeErrorResponse>(&body_text)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body_text);
            warn!(status = status.as_u16(), "code-for-key exchange rejected");
            return Err(AdvisoryError::OAuth(format!(
                "failed to exchange code for API key (status {status}): {detail}"
            )));
        }

        let parsed: ExchangeResponse = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::OAuth(format!("malformed exchange response: {e}")))?;

        Ok(parsed.key)
    }

    /// Fetch the available model list. Tolerates both a bare array and a
    /// `{"data": [...]}` wrapper.
    pub async fn list_models(&self, api_key: Option<&str>) -> Result<Vec<OpenRouterModel>> {
        let url = format!("{}/models", self.config.api_base_url);

        let mut request = self.http.get(&url);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let message = resp.text().await.unwrap_or_default();
            return Err(AdvisoryError::LlmApiError { status, message });
        }

        let parsed: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::LlmResponseParse(e.to_string()))?;

        Ok(match parsed {
            ModelsResponse::Wrapped { data } => data,
            ModelsResponse::Bare(models) => models,
        })
    }

    /// Probe an API key against the bearer-authenticated models endpoint.
    ///
    /// Returns `Ok(false)` for an HTTP rejection; network failures are errors
    /// so the caller can tell an invalid key from an unreachable provider.
    pub async fn test_api_key(&self, api_key: &str) -> Result<bool> {
        if api_key.trim().is_empty() {
            return Ok(false);
        }

        let url = format!("{}/models", self.config.api_base_url);
        let resp = self.http.get(&url).bearer_auth(api_key).send().await?;

        if resp.status().is_success() {
            Ok(true)
        } else {
            warn!(status = resp.status().as_u16(), "API key test rejected");
            Ok(false)
        }
    }

    /// Send a single chat-completion request with an explicit key and model,
    /// returning the assistant message content.
    pub async fn chat_completion(
        &self,
        api_key: &str,
        model: &str,
        messages: &[Message],
    ) -> Result<String> {
        if api_key.trim().is_empty() {
            return Err(AdvisoryError::Unauthorized);
        }

        let url = format!("{}/chat/completions", self.config.api_base_url);
        let body = ChatRequest { model, messages };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let message = resp.text().await.unwrap_or_default();
            return Err(AdvisoryError::LlmApiError { status, message });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::LlmResponseParse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AdvisoryError::LlmEmptyResponse)
    }
}
