//! Error types for foodgram.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Validation reason codes shared by the recipe and user rules.
pub mod reason {
    /// A required value or list is missing or empty.
    pub const REQUIRED: &str = "required";
    /// A list contains the same reference twice.
    pub const DUPLICATE: &str = "duplicate";
    /// A number is outside its configured bounds.
    pub const OUT_OF_RANGE: &str = "out_of_range";
    /// A referenced entity does not exist.
    pub const NOT_FOUND: &str = "not_found";
    /// A value does not match the expected format.
    pub const INVALID: &str = "invalid";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Recipe not found: {0}")]
    RecipeNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Cannot subscribe to yourself")]
    SelfReferenceForbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a validation error for a field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) | Self::RecipeNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::SelfReferenceForbidden | Self::BadRequest(_) | Self::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::RecipeNotFound(_) => "RECIPE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::SelfReferenceForbidden => "SELF_REFERENCE_FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let mut error = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let Self::Validation { field, reason } = &self {
            error["field"] = json!(field);
            error["reason"] = json!(reason);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        // Report the alphabetically first field so the message is stable.
        let first = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let code = errors
                    .first()
                    .map_or_else(|| reason::INVALID.to_string(), |e| e.code.to_string());
                (field.to_string(), code)
            })
            .min();

        match first {
            Some((field, code)) => Self::validation(field, code),
            None => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
