use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tower_sessions::Session;

use midvision_advisory::openrouter::pkce;
use midvision_advisory::AdvisoryError;

use crate::models::ApiError;
use crate::state::AppState;

pub(crate) const SESSION_KEY_AUTHENTICATED: &str = "authenticated";
const SESSION_KEY_USERNAME: &str = "admin_username";
const SESSION_KEY_PKCE_VERIFIER: &str = "openrouter_code_verifier";
pub(crate) const SESSION_KEY_API_KEY: &str = "openrouter_api_key";

#[derive(Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub auth_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn session_insert(session: &Session, key: &str, value: String) -> Result<(), ApiError> {
    session.insert(key, value).await.map_err(|e| {
        tracing::error!(key, error = %e, "failed to insert into session");
        ApiError::internal("session storage failed")
    })
}

/// Verify submitted credentials against the configured admin identity and
/// establish an authenticated session. There is no client-trusted flag; the
/// session store is the single source of truth.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthStatus>, ApiError> {
    let admin = state.config.admin.as_ref().ok_or_else(|| {
        ApiError::new(StatusCode::NOT_IMPLEMENTED, "authentication is not configured")
    })?;

    let submitted_digest = hex::encode(Sha256::digest(request.password.as_bytes()));

    if request.username != admin.username || submitted_digest != admin.password_sha256 {
        tracing::warn!(username = %request.username, "rejected admin login");
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid username or password",
        ));
    }

    session.cycle_id().await.map_err(|e| {
        tracing::error!(error = %e, "failed to rotate session ID");
        ApiError::internal("session storage failed")
    })?;

    session
        .insert(SESSION_KEY_AUTHENTICATED, true)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to mark session authenticated");
            ApiError::internal("session storage failed")
        })?;
    session_insert(&session, SESSION_KEY_USERNAME, admin.username.clone()).await?;

    tracing::info!(username = %admin.username, "admin login successful");

    Ok(Json(AuthStatus {
        authenticated: true,
        auth_configured: true,
        username: Some(admin.username.clone()),
    }))
}

pub async fn logout(session: Session) -> Result<StatusCode, ApiError> {
    session.flush().await.map_err(|e| {
        tracing::error!(error = %e, "failed to flush session");
        ApiError::internal("session storage failed")
    })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(State(state): State<AppState>, session: Session) -> Json<AuthStatus> {
    let auth_configured = state.config.is_auth_enabled();

    let authenticated: bool = session
        .get(SESSION_KEY_AUTHENTICATED)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

    let username: Option<String> = if authenticated {
        session.get(SESSION_KEY_USERNAME).await.ok().flatten()
    } else {
        None
    };

    Json(AuthStatus {
        authenticated,
        auth_configured,
        username,
    })
}

/// Identity of the caller, read from the session. `None` when anonymous.
pub async fn session_identity(session: &Session) -> Option<String> {
    let authenticated: bool = session
        .get(SESSION_KEY_AUTHENTICATED)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

    if authenticated {
        session.get(SESSION_KEY_USERNAME).await.ok().flatten()
    } else {
        None
    }
}

// --- OpenRouter OAuth PKCE flow ---

/// Start the PKCE flow: generate a verifier, park it in the session, and
/// redirect to the provider's authorization endpoint with the S256 challenge.
pub async fn openrouter_login(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, ApiError> {
    let verifier = pkce::generate_code_verifier();
    let challenge = pkce::code_challenge(&verifier);

    session_insert(&session, SESSION_KEY_PKCE_VERIFIER, verifier).await?;

    let auth_url = state
        .openrouter
        .authorization_url(&state.config.openrouter_callback_url(), &challenge);

    Ok(Redirect::temporary(&auth_url).into_response())
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

/// Complete the PKCE flow: exchange the authorization code and the held
/// verifier for an API key, then store the key in the session.
///
/// The verifier is *taken* out of the session before the exchange, so it is
/// gone on both the success and the failure path; a stale verifier can never
/// be replayed.
pub async fn openrouter_callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let verifier: String = session
        .remove(SESSION_KEY_PKCE_VERIFIER)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to read verifier from session");
            ApiError::internal("session storage failed")
        })?
        .ok_or_else(|| {
            tracing::warn!("OAuth callback without a stored code verifier");
            ApiError::from(AdvisoryError::MissingVerifier)
        })?;

    let key = state
        .openrouter
        .exchange_code(&params.code, &verifier)
        .await
        .map_err(ApiError::from)?;

    session_insert(&session, SESSION_KEY_API_KEY, key).await?;

    tracing::info!("OpenRouter key exchange successful");

    let base = &state.config.base_url;
    Ok(Redirect::temporary(&format!("{base}/admin")).into_response())
}
