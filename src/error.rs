//! Error types for the REST API.

use crate::auth::AuthError;
use crate::db::RepoError;
use crate::models::ValidationError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[cfg(test)]
mod tests;

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// Rate limit error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct RateLimitErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
    /// Seconds until reset.
    pub retry_after: u64,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A record with the same unique key already exists.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The record changed since the caller read it.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Missing, malformed or expired credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded {
        /// Maximum requests allowed.
        limit: u32,
        /// Remaining requests (always 0 when exceeded).
        remaining: u32,
        /// Unix timestamp when the rate limit resets.
        reset: u64,
        /// Seconds until reset.
        retry_after: u64,
    },
}

impl ApiError {
    /// Status code and machine readable code for the error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ApiError::Duplicate(_) => (StatusCode::CONFLICT, "DUPLICATE"),
            ApiError::ConcurrencyConflict(_) => (StatusCode::CONFLICT, "CONCURRENCY_CONFLICT"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::RateLimitExceeded { .. } => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::RateLimitExceeded {
                limit,
                remaining,
                reset,
                retry_after,
            } => {
                let body = Json(RateLimitErrorResponse {
                    error: "Rate limit exceeded".to_string(),
                    code: "RATE_LIMIT_EXCEEDED".to_string(),
                    limit: *limit,
                    remaining: *remaining,
                    reset: *reset,
                    retry_after: *retry_after,
                });

                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [
                        ("X-RateLimit-Limit", limit.to_string()),
                        ("X-RateLimit-Remaining", remaining.to_string()),
                        ("X-RateLimit-Reset", reset.to_string()),
                        ("Retry-After", retry_after.to_string()),
                    ],
                    body,
                )
                    .into_response()
            }
            _ => {
                let (status, code) = self.status_and_code();

                // Storage and internal details stay in the log.
                let message = if status.is_server_error() {
                    error!(error = %self, "request failed");
                    "Internal server error".to_string()
                } else {
                    self.to_string()
                };

                let body = Json(ErrorResponse {
                    error: message,
                    code: code.to_string(),
                });

                (status, body).into_response()
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { kind, id } => ApiError::NotFound(format!("{} {}", kind, id)),
            RepoError::Duplicate(message) => ApiError::Duplicate(message),
            RepoError::Concurrency { kind, id } => ApiError::ConcurrencyConflict(format!(
                "{} {} was modified by another request",
                kind, id
            )),
            RepoError::InvalidReference(message) => ApiError::InvalidRequest(message),
            RepoError::Database(e) => ApiError::Database(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken(_) | AuthError::ExpiredToken => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::TokenCreation(_) | AuthError::PasswordHash(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
