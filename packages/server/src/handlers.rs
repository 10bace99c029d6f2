use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use midvision_advisory::directory::{ProviderFilter, ProviderRecord};
use midvision_advisory::models::{HospitalProfile, RecommendationResult};
use midvision_advisory::openrouter::OpenRouterModel;
use midvision_advisory::persistence::PersistenceAdapter;
use midvision_advisory::recommendation::Message;

use crate::auth::{session_identity, SESSION_KEY_API_KEY};
use crate::models::{ApiError, DiagnosticEntry, PaginatedResponse};
use crate::state::AppState;

// --- Health ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "health check query failed");
            ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "database unreachable")
        })?;

    Ok(Json(HealthResponse { status: "ok" }))
}

// --- Diagnostic submission ---

/// Take a hospital profile, generate recommendations, and persist the pair
/// when the caller has an authenticated identity. Anonymous submissions get
/// the same recommendations but are not stored.
pub async fn submit_diagnostic(
    State(state): State<AppState>,
    session: Session,
    Json(profile): Json<HospitalProfile>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let result = state.requester.generate(&profile).await?;

    if let Some(user_id) = session_identity(&session).await {
        let adapter = PersistenceAdapter::new(state.pool.clone());
        let stored = adapter.store(&user_id, &profile, &result).await?;
        tracing::info!(diagnostic_id = %stored.diagnostic_id, "diagnostic persisted");
    }

    Ok(Json(result))
}

// --- Provider directory ---

#[derive(Deserialize)]
pub struct ProvidersQuery {
    pub search: Option<String>,
    /// Comma-separated specialty names.
    pub specialty: Option<String>,
    /// Comma-separated technology names.
    pub technology: Option<String>,
}

fn split_facet(raw: Option<String>) -> Vec<String> {
    raw.map(|v| {
        v.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub async fn list_providers(
    State(state): State<AppState>,
    Query(params): Query<ProvidersQuery>,
) -> Json<Vec<ProviderRecord>> {
    let filter = ProviderFilter {
        search_term: params.search.unwrap_or_default(),
        specialties: split_facet(params.specialty),
        technologies: split_facet(params.technology),
    };

    let matched: Vec<ProviderRecord> = state
        .directory
        .filter(&filter)
        .into_iter()
        .cloned()
        .collect();

    Json(matched)
}

#[derive(Serialize)]
pub struct FacetsResponse {
    pub specialties: Vec<String>,
    pub technologies: Vec<String>,
}

pub async fn provider_facets(State(state): State<AppState>) -> Json<FacetsResponse> {
    Json(FacetsResponse {
        specialties: state.directory.all_specialties(),
        technologies: state.directory.all_technologies(),
    })
}

// --- Admin: OpenRouter key management ---

#[derive(Serialize)]
pub struct KeyStatusResponse {
    pub connected: bool,
}

async fn session_api_key(session: &Session) -> Result<Option<String>, ApiError> {
    session.get(SESSION_KEY_API_KEY).await.map_err(|e| {
        tracing::error!(error = %e, "failed to read API key from session");
        ApiError::internal("session storage failed")
    })
}

pub async fn key_status(session: Session) -> Result<Json<KeyStatusResponse>, ApiError> {
    let connected = session_api_key(&session).await?.is_some();
    Ok(Json(KeyStatusResponse { connected }))
}

#[derive(Serialize)]
pub struct KeyTestResponse {
    pub valid: bool,
}

pub async fn key_test(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<KeyTestResponse>, ApiError> {
    let key = session_api_key(&session).await?.unwrap_or_default();
    let valid = state.openrouter.test_api_key(&key).await?;
    Ok(Json(KeyTestResponse { valid }))
}

pub async fn key_delete(session: Session) -> Result<StatusCode, ApiError> {
    let _removed: Option<String> =
        session.remove(SESSION_KEY_API_KEY).await.map_err(|e| {
            tracing::error!(error = %e, "failed to remove API key from session");
            ApiError::internal("session storage failed")
        })?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Admin: models and chat ---

pub async fn list_models(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<OpenRouterModel>>, ApiError> {
    let key = session_api_key(&session).await?;
    let models = state.openrouter.list_models(key.as_deref()).await?;
    Ok(Json(models))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub content: String,
}

pub async fn chat(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let key = session_api_key(&session).await?.ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "no OpenRouter key connected; complete the OAuth flow first",
        )
    })?;

    let content = state
        .openrouter
        .chat_completion(&key, &request.model, &request.messages)
        .await?;

    Ok(Json(ChatReply { content }))
}

// --- Admin: diagnostic listing ---

#[derive(Deserialize)]
pub struct DiagnosticsQuery {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

const ALLOWED_SORT_COLUMNS: &[&str] = &[
    "hospital_name",
    "hospital_size",
    "ar_mr_experience",
    "created_at",
];

pub async fn list_diagnostics(
    State(state): State<AppState>,
    Query(params): Query<DiagnosticsQuery>,
) -> Result<Json<PaginatedResponse<DiagnosticEntry>>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let sort_column = params.sort.as_deref().unwrap_or("created_at");
    if !ALLOWED_SORT_COLUMNS.contains(&sort_column) {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("unsupported sort column: {sort_column}"),
        ));
    }

    let order = match params.order.as_deref() {
        Some("ASC" | "asc") => "ASC",
        _ => "DESC",
    };

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM diagnostics")
        .fetch_one(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "count query failed");
            ApiError::internal("database query failed")
        })?;

    // Sort column is validated against an allowlist above, so interpolating
    // it into the query string is safe.
    let query_str = format!(
        "SELECT id, user_id, hospital_name, hospital_size::text as hospital_size, \
         specialties, ar_mr_experience::text as ar_mr_experience, needs_assessment, created_at \
         FROM diagnostics \
         ORDER BY {sort_column} {order} LIMIT $1 OFFSET $2"
    );

    let data: Vec<DiagnosticEntry> = sqlx::query_as::<_, DiagnosticEntry>(&query_str)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "data query failed");
            ApiError::internal("database query failed")
        })?;

    Ok(Json(PaginatedResponse {
        data,
        total,
        limit,
        offset,
    }))
}
