use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AdvisoryError, Result};
use crate::models::{HospitalProfile, RecommendationResult};
use crate::recommendation::client::{LlmClient, LlmRequest, Message, Role};
use crate::recommendation::config::RecommendationConfig;
use crate::recommendation::prompt;
use crate::recommendation::schema::OutputValidator;

/// Recommendation requester.
///
/// Validates a hospital profile, sends it to the LLM as a structured prompt,
/// and returns the parsed, schema-validated recommendation result. Input
/// failing validation is rejected before any network call. Model failures
/// surface as a single error; there is no partial result.
pub struct Requester {
    client: Arc<dyn LlmClient>,
    config: RecommendationConfig,
    validator: OutputValidator,
}

impl Requester {
    pub fn new(client: Arc<dyn LlmClient>, config: RecommendationConfig) -> Result<Self> {
        let validator = OutputValidator::new()?;
        Ok(Self {
            client,
            config,
            validator,
        })
    }

    /// Generate personalized recommendations for one profile submission.
    pub async fn generate(&self, profile: &HospitalProfile) -> Result<RecommendationResult> {
        profile.validate()?;

        info!(hospital = %profile.hospital_name, "generating recommendations");

        let request = LlmRequest {
            messages: vec![
                Message {
                    role: Role::System,
                    content: prompt::build_system_prompt().to_string(),
                },
                Message {
                    role: Role::User,
                    content: prompt::build_recommendation_prompt(profile),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self.client.complete(&request).await?;
        debug!(bytes = response.content.len(), "model response received");

        let json_str = extract_json_from_response(&response.content);
        let value: serde_json::Value = serde_json::from_str(&json_str).map_err(|e| {
            warn!(error = %e, "model output is not valid JSON");
            AdvisoryError::LlmResponseParse(format!("model output is not valid JSON: {e}"))
        })?;

        self.validator.validate(&value)?;

        let result: RecommendationResult = serde_json::from_value(value)
            .map_err(|e| AdvisoryError::LlmResponseParse(e.to_string()))?;

        Ok(result)
    }
}

/// Extract the JSON object from an LLM response, stripping markdown fences
/// if present.
///
/// When multiple fenced blocks exist, prefers the one containing `"summary"`.
/// Falls back to the last fenced block, since LLMs often put explanatory
/// blocks first. Without fences, trims to the outermost braces.
pub fn extract_json_from_response(response: &str) -> String {
    let trimmed = response.trim();

    let blocks = extract_fenced_blocks(trimmed);

    if !blocks.is_empty() {
        if let Some(block) = blocks.iter().find(|b| b.contains("\"summary\"")) {
            return block.trim().to_string();
        }
        if let Some(block) = blocks.last() {
            return block.trim().to_string();
        }
    }

    // No fences: tolerate prose around a bare object.
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Extract all fenced code blocks from text.
fn extract_fenced_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut remaining = text;

    while let Some(start) = remaining.find("```") {
        let after_fence = &remaining[start + 3..];
        // Skip optional language identifier on the same line
        let content_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let content = &after_fence[content_start..];
        if let Some(end) = content.find("```") {
            blocks.push(content[..end].to_string());
            remaining = &content[end + 3..];
        } else {
            break;
        }
    }

    blocks
}
