use std::sync::Arc;

use midvision_advisory::directory::ProviderDirectory;
use midvision_advisory::openrouter::OpenRouterAuth;
use midvision_advisory::recommendation::Requester;
use sqlx::PgPool;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub requester: Arc<Requester>,
    pub openrouter: Arc<OpenRouterAuth>,
    pub directory: Arc<ProviderDirectory>,
    pub config: Arc<AppConfig>,
}
