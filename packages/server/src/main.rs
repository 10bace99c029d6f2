use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

use midvision_advisory::db;
use midvision_advisory::directory::ProviderDirectory;
use midvision_advisory::openrouter::{OpenRouterAuth, OpenRouterConfig};
use midvision_advisory::recommendation::{OpenRouterClient, RecommendationConfig, Requester};

use midvision_server::{router, AppConfig, AppState};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 10;
const RETRY_INTERVAL: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_config = AppConfig::from_env();

    let database_url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL environment variable is not set");
            std::process::exit(1);
        }
    };

    tracing::info!("connecting to database...");

    let mut pool = None;
    for attempt in 1..=MAX_RETRIES {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&database_url)
            .await
        {
            Ok(p) => {
                pool = Some(p);
                break;
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "failed to connect, retrying...");
                if attempt == MAX_RETRIES {
                    tracing::error!("exhausted all {MAX_RETRIES} connection attempts");
                    std::process::exit(1);
                }
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
        }
    }
    let pool: PgPool = pool.unwrap_or_else(|| {
        tracing::error!("unreachable: no pool after retry loop");
        std::process::exit(1);
    });

    tracing::info!("connected to database");

    tracing::info!("running database migrations...");
    if let Err(e) = db::run_migrations(&pool).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }
    tracing::info!("migrations completed");

    let recommendation_config = match RecommendationConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "recommendation configuration is invalid");
            std::process::exit(1);
        }
    };

    let llm_client = match OpenRouterClient::new(&recommendation_config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build LLM client");
            std::process::exit(1);
        }
    };

    let requester = match Requester::new(Arc::new(llm_client), recommendation_config) {
        Ok(requester) => requester,
        Err(e) => {
            tracing::error!(error = %e, "failed to build recommendation requester");
            std::process::exit(1);
        }
    };

    let openrouter = match OpenRouterAuth::new(OpenRouterConfig::from_env()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build OpenRouter client");
            std::process::exit(1);
        }
    };

    let directory = match ProviderDirectory::load() {
        Ok(directory) => directory,
        Err(e) => {
            tracing::error!(error = %e, "failed to load provider seed data");
            std::process::exit(1);
        }
    };
    tracing::info!(providers = directory.all().len(), "provider directory loaded");

    let app_state = AppState {
        pool,
        requester: Arc::new(requester),
        openrouter: Arc::new(openrouter),
        directory: Arc::new(directory),
        config: Arc::new(app_config),
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(8)))
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_secure(app_state.config.is_auth_enabled());

    let app = router(app_state).layer(session_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to bind on {addr}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
