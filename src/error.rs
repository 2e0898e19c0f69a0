use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Validation(ValidationErrors),
    Internal(String),
    Database(sqlx::Error),
}

/// Field-level validation failures, keyed by input field name.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Empty map passes, anything else becomes a 422.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Validation(errors) => {
                write!(f, "Validation failed on {} field(s)", errors.0.len())
            }
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(msg) => error_body(StatusCode::NOT_FOUND, &msg),
            AppError::Unauthorized(msg) => error_body(StatusCode::UNAUTHORIZED, &msg),
            AppError::Forbidden(msg) => error_body(StatusCode::FORBIDDEN, &msg),
            AppError::BadRequest(msg) => error_body(StatusCode::BAD_REQUEST, &msg),
            AppError::Validation(errors) => {
                let body = json!({
                    "error": "The given data was invalid.",
                    "errors": errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> Response {
    let body = json!({ "error": message });
    (status, axum::Json(body)).into_response()
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
