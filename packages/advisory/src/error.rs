use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid hospital profile: {}", errors.join(", "))]
    InvalidProfile { errors: Vec<String> },

    #[error("LLM API request failed: {0}")]
    LlmApiRequest(#[from] reqwest::Error),

    #[error("LLM API error (status {status}): {message}")]
    LlmApiError { status: u16, message: String },

    #[error("failed to parse LLM response: {0}")]
    LlmResponseParse(String),

    #[error("LLM returned empty response")]
    LlmEmptyResponse,

    #[error("schema validation failed: {}", errors.join(", "))]
    SchemaValidation { errors: Vec<String> },

    #[error("schema load error: {0}")]
    SchemaLoad(String),

    #[error("OAuth key exchange failed: {0}")]
    OAuth(String),

    #[error("no code verifier available for exchange")]
    MissingVerifier,

    #[error("caller is not authenticated")]
    Unauthorized,

    #[error("provider directory seed is invalid: {0}")]
    DirectorySeed(String),
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;
