//! Mid-Vision advisory core.
//!
//! Domain library for the Yura Mid-Vision lead-generation service:
//! diagnostic intake and validation, the LLM-backed recommendation
//! requester, Postgres persistence of submissions, the OpenRouter OAuth
//! PKCE key exchange, and the static provider directory.

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod openrouter;
pub mod persistence;
pub mod recommendation;

pub use config::DatabaseConfig;
pub use db::{create_pool, run_migrations};
pub use error::{AdvisoryError, Result};
pub use models::{
    ArMrExperience, Diagnostic, HospitalProfile, HospitalSize, RecommendationRecord,
    RecommendationResult, StoredSubmission,
};
pub use persistence::PersistenceAdapter;
