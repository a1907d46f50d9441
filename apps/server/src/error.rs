//! Error types for the HTTP server

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Store(#[from] bedfinder_core::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body")]
    InvalidFields(#[from] ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message, fields) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), None),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            Error::InvalidFields(errors) => (
                StatusCode::BAD_REQUEST,
                self.to_string(),
                Some(field_messages(errors)),
            ),
            Error::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            Error::Store(_) | Error::Database(_) | Error::Internal(_) | Error::Other(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "status": status.as_u16(),
            "code": status_code_name(status),
            "message": message,
        });
        if let Some(fields) = fields {
            error["fields"] = fields;
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Flatten validator output into `{"field": ["message", ...]}`.
fn field_messages(errors: &ValidationErrors) -> JsonValue {
    let mut fields = Map::new();
    for (field, problems) in errors.field_errors() {
        let messages = problems
            .iter()
            .map(|problem| {
                problem
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid {}", problem.code))
            })
            .map(JsonValue::String)
            .collect();
        fields.insert(field.to_string(), JsonValue::Array(messages));
    }
    JsonValue::Object(fields)
}

fn status_code_name(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "invalid",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::NOT_FOUND => "not-found",
        _ => "exception",
    }
}
