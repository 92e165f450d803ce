//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::provider::ProviderError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Unique constraint hit on create (email or provider identity)
    #[error("Account already exists: {0}")]
    DuplicateKey(String),

    /// Login rejected without saying which part failed
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// No credential on the request
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Token malformed, badly signed, not yet valid or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Authenticated but the role is too low
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Caller supplied bad input
    #[error("Malformed parameters: {0}")]
    MalformedParameters(String),

    #[error("Cannot delete your own account")]
    CannotDeleteSelf,

    #[error("Unsupported auth provider: {0}")]
    UnsupportedProvider(String),

    /// Upstream registration failed; nothing was written locally
    #[error("Registration failed")]
    RegistrationFailed(#[source] ProviderError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::DuplicateKey(_) => ErrorKind::Conflict,
            AuthError::AuthenticationFailed
            | AuthError::MissingCredentials(_)
            | AuthError::InvalidToken(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::MalformedParameters(_)
            | AuthError::CannotDeleteSelf
            | AuthError::UnsupportedProvider(_) => ErrorKind::BadRequest,
            AuthError::RegistrationFailed(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError.
    ///
    /// Server-side failures keep their detail in the logs only.
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::InternalServerError => {
                let message = match self {
                    AuthError::RegistrationFailed(_) => "Registration failed",
                    _ => "Internal server error",
                };
                AppError::new(ErrorKind::InternalServerError, message)
            }
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::RegistrationFailed(e) => {
                tracing::error!(error = %e, "Upstream registration failed");
            }
            AuthError::AuthenticationFailed => {
                tracing::warn!("Failed login attempt");
            }
            AuthError::Forbidden(reason) => {
                tracing::warn!(reason = %reason, "Access denied");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::MalformedParameters(err.message().to_string()),
            ErrorKind::NotFound => AuthError::AccountNotFound,
            ErrorKind::Conflict => AuthError::DuplicateKey(err.message().to_string()),
            ErrorKind::Unauthorized => AuthError::InvalidToken(err.message().to_string()),
            ErrorKind::Forbidden => AuthError::Forbidden(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
