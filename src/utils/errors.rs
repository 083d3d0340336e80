//! Error handling for Launchpad
//!
//! This module defines the main error type used throughout the application,
//! its classification helpers and the JSON response it renders to.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// Main error type for the Launchpad application
#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Account is banned")]
    UserBanned,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Comment not found: {comment_id}")]
    CommentNotFound { comment_id: i64 },

    #[error("Unknown boost plan: {0}")]
    UnknownBoostPlan(String),

    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for LaunchpadError {
    fn from(err: config::ConfigError) -> Self {
        LaunchpadError::Config(err.to_string())
    }
}

impl From<JsonRejection> for LaunchpadError {
    fn from(rejection: JsonRejection) -> Self {
        LaunchpadError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for LaunchpadError {
    fn from(rejection: PathRejection) -> Self {
        LaunchpadError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for LaunchpadError {
    fn from(rejection: QueryRejection) -> Self {
        LaunchpadError::InvalidInput(rejection.body_text())
    }
}

/// Result type alias for Launchpad operations
pub type Result<T> = std::result::Result<T, LaunchpadError>;

impl LaunchpadError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            LaunchpadError::Database(_) => false,
            LaunchpadError::Migration(_) => false,
            LaunchpadError::Redis(_) => true,
            LaunchpadError::Serialization(_) => false,
            LaunchpadError::Io(_) => true,
            LaunchpadError::Config(_) => false,
            LaunchpadError::Unauthorized => false,
            LaunchpadError::PermissionDenied(_) => false,
            LaunchpadError::UserBanned => false,
            LaunchpadError::UserNotFound(_) => false,
            LaunchpadError::ProductNotFound(_) => false,
            LaunchpadError::CommentNotFound { .. } => false,
            LaunchpadError::NotFound(_) => false,
            LaunchpadError::UnknownBoostPlan(_) => false,
            LaunchpadError::InsufficientPoints { .. } => false,
            LaunchpadError::InvalidStateTransition { .. } => false,
            LaunchpadError::Conflict(_) => false,
            LaunchpadError::InvalidInput(_) => false,
            LaunchpadError::RateLimitExceeded => true,
            LaunchpadError::Internal(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LaunchpadError::Database(_) => ErrorSeverity::Critical,
            LaunchpadError::Migration(_) => ErrorSeverity::Critical,
            LaunchpadError::Config(_) => ErrorSeverity::Critical,
            LaunchpadError::Unauthorized => ErrorSeverity::Info,
            LaunchpadError::PermissionDenied(_) => ErrorSeverity::Warning,
            LaunchpadError::UserBanned => ErrorSeverity::Warning,
            LaunchpadError::RateLimitExceeded => ErrorSeverity::Warning,
            LaunchpadError::InvalidInput(_) => ErrorSeverity::Info,
            LaunchpadError::UserNotFound(_)
            | LaunchpadError::ProductNotFound(_)
            | LaunchpadError::CommentNotFound { .. }
            | LaunchpadError::NotFound(_)
            | LaunchpadError::UnknownBoostPlan(_)
            | LaunchpadError::InsufficientPoints { .. }
            | LaunchpadError::InvalidStateTransition { .. }
            | LaunchpadError::Conflict(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status the error is rendered with
    pub fn status_code(&self) -> StatusCode {
        match self {
            LaunchpadError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            LaunchpadError::Unauthorized => StatusCode::UNAUTHORIZED,
            LaunchpadError::PermissionDenied(_) | LaunchpadError::UserBanned => StatusCode::FORBIDDEN,
            LaunchpadError::UserNotFound(_)
            | LaunchpadError::ProductNotFound(_)
            | LaunchpadError::CommentNotFound { .. }
            | LaunchpadError::NotFound(_) => StatusCode::NOT_FOUND,
            LaunchpadError::UnknownBoostPlan(_) | LaunchpadError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LaunchpadError::InsufficientPoints { .. } => StatusCode::PAYMENT_REQUIRED,
            LaunchpadError::InvalidStateTransition { .. } | LaunchpadError::Conflict(_) => StatusCode::CONFLICT,
            LaunchpadError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            LaunchpadError::Redis(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            LaunchpadError::Database(e) if is_unique_violation(e) => "conflict",
            LaunchpadError::Database(_) => "database_error",
            LaunchpadError::Migration(_) => "migration_error",
            LaunchpadError::Redis(_) => "session_store_unavailable",
            LaunchpadError::Serialization(_) => "serialization_error",
            LaunchpadError::Io(_) => "io_error",
            LaunchpadError::Config(_) => "config_error",
            LaunchpadError::Unauthorized => "unauthorized",
            LaunchpadError::PermissionDenied(_) => "permission_denied",
            LaunchpadError::UserBanned => "user_banned",
            LaunchpadError::UserNotFound(_) => "user_not_found",
            LaunchpadError::ProductNotFound(_) => "product_not_found",
            LaunchpadError::CommentNotFound { .. } => "comment_not_found",
            LaunchpadError::NotFound(_) => "not_found",
            LaunchpadError::UnknownBoostPlan(_) => "unknown_boost_plan",
            LaunchpadError::InsufficientPoints { .. } => "insufficient_points",
            LaunchpadError::InvalidStateTransition { .. } => "invalid_state_transition",
            LaunchpadError::Conflict(_) => "conflict",
            LaunchpadError::InvalidInput(_) => "invalid_input",
            LaunchpadError::RateLimitExceeded => "rate_limited",
            LaunchpadError::Internal(_) => "internal_error",
        }
    }

    /// Message safe to show to API clients
    fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            StatusCode::CONFLICT if matches!(self, LaunchpadError::Database(_)) => {
                "Resource already exists".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Whether a database error is a PostgreSQL unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

impl IntoResponse for LaunchpadError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, severity = %self.severity(), "Request failed");
        }

        let body = serde_json::json!({
            "error": self.public_message(),
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(LaunchpadError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(LaunchpadError::UserBanned.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            LaunchpadError::ProductNotFound("acme".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LaunchpadError::InsufficientPoints { required: 500, available: 20 }.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            LaunchpadError::InvalidStateTransition { from: "hidden".into(), to: "flagged".into() }.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(LaunchpadError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            LaunchpadError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_severity_and_recoverability() {
        assert_eq!(LaunchpadError::Config("x".into()).severity(), ErrorSeverity::Critical);
        assert_eq!(LaunchpadError::InvalidInput("x".into()).severity(), ErrorSeverity::Info);
        assert!(LaunchpadError::RateLimitExceeded.is_recoverable());
        assert!(!LaunchpadError::UserBanned.is_recoverable());
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = LaunchpadError::Internal("connection string leaked".to_string());
        assert_eq!(err.public_message(), "Internal server error");

        let err = LaunchpadError::InvalidInput("name is required".to_string());
        assert_eq!(err.public_message(), "Invalid input: name is required");
    }

    #[test]
    fn test_insufficient_points_message() {
        let err = LaunchpadError::InsufficientPoints { required: 500, available: 120 };
        assert_eq!(err.to_string(), "Insufficient points: 500 required, 120 available");
        assert_eq!(err.code(), "insufficient_points");
    }
}
