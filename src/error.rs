use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Field name -> list of messages, rendered as `{"errors": {...}}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const REQUIRED_FIELD: &str = "This field is required.";

pub fn field_error(field: &str, message: impl Into<String>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.into()]);
    errors
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No bearer token on a route that needs one.
    #[error("Authentication credentials were not provided")]
    AuthenticationFailed,

    /// Bearer token present but unusable (malformed, expired, wrong type, unknown user).
    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User account is disabled")]
    AccountDisabled,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    pub fn event_not_found() -> Self {
        AppError::NotFound("Event not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationFailed
            | AppError::InvalidToken
            | AppError::InvalidCredentials
            | AppError::AccountDisabled => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::AuthenticationFailed => {
                json!({ "error": "Authentication credentials were not provided" })
            }
            AppError::InvalidToken => json!({ "error": "Given token not valid" }),
            AppError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
            AppError::AccountDisabled => json!({ "error": "User account is disabled" }),
            AppError::Forbidden(msg) | AppError::NotFound(msg) | AppError::BadRequest(msg) => {
                json!({ "error": msg })
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "Internal server error" })
            }
            AppError::InternalError => json!({ "error": "Internal server error" }),
        };

        (status, Json(body)).into_response()
    }
}
