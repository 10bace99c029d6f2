use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use midvision_advisory::AdvisoryError;
use serde::Serialize;

#[derive(Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Admin listing row. Enum columns are cast to text in the query.
#[derive(Serialize, sqlx::FromRow)]
pub struct DiagnosticEntry {
    pub id: sqlx::types::Uuid,
    pub user_id: String,
    pub hospital_name: String,
    pub hospital_size: String,
    pub specialties: String,
    pub ar_mr_experience: String,
    pub needs_assessment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<String>,
}

/// A handler error carrying an HTTP status and a human-readable message.
///
/// Every user-visible failure renders as a single dismissible message; field
/// errors are attached only for local validation failures.
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field_errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field_errors: Vec::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<AdvisoryError> for ApiError {
    fn from(err: AdvisoryError) -> Self {
        match err {
            AdvisoryError::InvalidProfile { errors } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: "hospital profile failed validation".into(),
                field_errors: errors,
            },
            AdvisoryError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AdvisoryError::MissingVerifier => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            AdvisoryError::OAuth(_)
            | AdvisoryError::LlmApiRequest(_)
            | AdvisoryError::LlmApiError { .. }
            | AdvisoryError::LlmResponseParse(_)
            | AdvisoryError::LlmEmptyResponse
            | AdvisoryError::SchemaValidation { .. } => {
                Self::new(StatusCode::BAD_GATEWAY, err.to_string())
            }
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.message, "request rejected");
        }

        let body = ErrorResponse {
            error: self.message,
            field_errors: self.field_errors,
        };
        (self.status, Json(body)).into_response()
    }
}
