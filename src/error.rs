// error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    #[error("invalid payload")]
    Validation(Vec<FieldError>),

    #[error("voting for petition not allowed")]
    VotingClosed,

    #[error("{message}")]
    Auth { message: String, details: String },

    #[error("authentication required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One offending field in a rejected payload.
#[derive(Debug)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
            }
            AppError::Validation(fields) => {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .into_iter()
                    .map(|f| (f.field.to_string(), json!(f.message)))
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "invalid payload", "fields": fields })),
                )
                    .into_response()
            }
            AppError::VotingClosed => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "voting for petition not allowed" })),
            )
                .into_response(),
            AppError::Auth { message, details } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message, "details": details })),
            )
                .into_response(),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication required" })),
            )
                .into_response(),
            AppError::Database(e) => {
                error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}
