mod client;
mod config;
mod prompt;
mod requester;
mod schema;

pub use client::{LlmClient, LlmRequest, LlmResponse, Message, OpenRouterClient, Role};
#[cfg(any(test, feature = "test-utils"))]
pub use client::test_support::MockLlmClient;
pub use config::{RecommendationConfig, RecommendationConfigBuilder};
pub use prompt::{build_recommendation_prompt, build_system_prompt};
pub use requester::{extract_json_from_response, Requester};
pub use schema::OutputValidator;
