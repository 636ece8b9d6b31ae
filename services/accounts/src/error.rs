//! Custom error types for the account service
//!
//! `ApiError` is the one place where handler failures become responses.
//! Business outcomes keep their status codes; infrastructure failures are
//! answered with an opaque envelope and the detail only goes to the logs.

use std::any::Any;
use std::fmt::Display;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::CacheError;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::password::PasswordError;

/// Custom error type for the account service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Signup with an email that already has credentials
    #[error("user already exists")]
    UserExists,

    /// Bad request with message
    #[error("{0}")]
    BadRequest(String),

    /// Request body, query string or path could not be extracted
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// Authentication for an email that was never registered
    #[error("user email does not exist")]
    EmailNotFound,

    /// Wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credentials were stored but the profile was not, and cleanup failed
    #[error("Signup of account {id} ({email}) is incomplete: {source}")]
    SignupIncomplete {
        id: Uuid,
        email: String,
        #[source]
        source: CacheError,
    },

    /// Key/value store failure
    #[error("Store error: {0}")]
    Store(#[from] CacheError),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password hashing failure
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

impl ApiError {
    /// Stable error kind reported to clients for server-side failures
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::UserExists => "user_exists",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Rejected { .. } => "invalid_request",
            ApiError::EmailNotFound => "email_not_found",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::SignupIncomplete { .. } => "signup_incomplete",
            ApiError::Store(_) => "store_unavailable",
            ApiError::Serialization(_) => "serialization_failed",
            ApiError::Password(_) => "password_hashing_failed",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UserExists | ApiError::BadRequest(_) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::Rejected { status, ref message } => (
                status,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::EmailNotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::SignupIncomplete { id, ref email, .. } => {
                error!(account_id = %id, email = %email, "Signup needs manual reconciliation");
                internal_error(self.kind(), &self)
            }
            _ => internal_error(self.kind(), &self),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Log `detail` under a fresh correlation id and answer with an opaque 500
pub fn internal_error(kind: &str, detail: &dyn Display) -> Response {
    let correlation_id = Uuid::new_v4();
    error!(%correlation_id, kind, "Request failed: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": kind,
            "correlationId": correlation_id,
        })),
    )
        .into_response()
}

/// Response for a panicking handler, used by `CatchPanicLayer`
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    internal_error("internal_error", &detail)
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
