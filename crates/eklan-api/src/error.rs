use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid learner ids: {0:?}")]
    InvalidLearners(Vec<Uuid>),
    #[error("Authorization error: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::InvalidLearners(ids) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Some learner ids do not resolve to existing learners",
                    "invalid_learner_ids": ids,
                }),
            ),
            Self::Auth(message) => (StatusCode::FORBIDDEN, json!({ "error": message })),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "error": message })),
            Self::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "detail": err.to_string() }),
                )
            }
            Self::Internal(message) => {
                tracing::error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error", "detail": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
