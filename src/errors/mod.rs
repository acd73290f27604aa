//! Error handling module for the site backend.
//!
//! Domain errors are produced by the store, listing, admin and auth layers.
//! Every one of them is caught at the HTTP boundary and converted into an
//! [`AppError`], which maps to a status code and the response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFIRMATION_REQUIRED: &str = "CONFIRMATION_REQUIRED";
    pub const OPERATION_FAILED: &str = "OPERATION_FAILED";
    pub const DATA_FETCH_FAILED: &str = "DATA_FETCH_FAILED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

// ==================== DOMAIN ERRORS ====================

/// A stored document could not be turned into a typed entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("malformed calendar date {0:?}")]
    InvalidDate(String),
}

/// A required form field is missing or out of range. Raised before any
/// store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required(field) => field,
            ValidationError::Invalid { field, .. } => field,
        }
    }
}

/// Failure reported by a [`crate::db::ContentStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A create, delete or upsert against the store failed. Local state is left
/// untouched and no retry is attempted.
#[derive(Debug, Error)]
#[error("failed to {action} in `{collection}`: {source}")]
pub struct OperationError {
    pub action: &'static str,
    pub collection: String,
    #[source]
    pub source: StoreError,
}

impl OperationError {
    #[cfg(test)]
    pub fn is_not_found(&self) -> bool {
        matches!(self.source, StoreError::NotFound { .. })
    }
}

/// Loading a listing collection failed. The caller retries with a full
/// re-fetch.
#[derive(Debug, Error)]
#[error("failed to load `{collection}`: {source}")]
pub struct DataFetchError {
    pub collection: String,
    #[source]
    pub source: StoreError,
}

/// Failure of an admin add or remove.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Creating or updating an admin account failed.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Sign-in failure categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentialFormat,
    AccountDisabled,
    UnknownAccount,
    WrongSecret,
    RateLimited,
    /// A provider code this service does not recognise.
    Unknown(String),
}

impl AuthErrorKind {
    /// Map a provider error code onto a kind.
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/invalid-email" => AuthErrorKind::InvalidCredentialFormat,
            "auth/user-disabled" => AuthErrorKind::AccountDisabled,
            "auth/user-not-found" => AuthErrorKind::UnknownAccount,
            "auth/wrong-password" => AuthErrorKind::WrongSecret,
            "auth/too-many-requests" => AuthErrorKind::RateLimited,
            other => AuthErrorKind::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthErrorKind::InvalidCredentialFormat => "auth/invalid-email",
            AuthErrorKind::AccountDisabled => "auth/user-disabled",
            AuthErrorKind::UnknownAccount => "auth/user-not-found",
            AuthErrorKind::WrongSecret => "auth/wrong-password",
            AuthErrorKind::RateLimited => "auth/too-many-requests",
            AuthErrorKind::Unknown(code) => code,
        }
    }

    /// Fixed human-readable message shown on the sign-in form.
    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorKind::InvalidCredentialFormat => "Invalid email address",
            AuthErrorKind::AccountDisabled => "This account has been disabled",
            AuthErrorKind::UnknownAccount => "User not found",
            AuthErrorKind::WrongSecret => "Incorrect password",
            AuthErrorKind::RateLimited => "Too many attempts. Please try again later",
            AuthErrorKind::Unknown(_) => "Sign-in failed. Please try again",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .kind.message())]
pub struct AuthError {
    pub kind: AuthErrorKind,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }
}

// ==================== HTTP ERRORS ====================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required or rejected
    Unauthorized {
        message: String,
        kind: Option<AuthErrorKind>,
    },
    /// Too many failed sign-in attempts
    RateLimited(String),
    /// Resource not found
    NotFound(String),
    /// Validation error on a named form field
    Validation {
        message: String,
        field: &'static str,
    },
    /// Destructive action sent without confirmation
    ConfirmationRequired(String),
    /// Store write failed
    Operation(String),
    /// Store read failed; the client may retry the full fetch
    DataFetch(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::ConfirmationRequired(_) => StatusCode::BAD_REQUEST,
            AppError::Operation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DataFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized { .. } => codes::UNAUTHORIZED,
            AppError::RateLimited(_) => codes::RATE_LIMITED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation { .. } => codes::VALIDATION_ERROR,
            AppError::ConfirmationRequired(_) => codes::CONFIRMATION_REQUIRED,
            AppError::Operation(_) => codes::OPERATION_FAILED,
            AppError::DataFetch(_) => codes::DATA_FETCH_FAILED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized { message, .. } => message.clone(),
            AppError::RateLimited(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::ConfirmationRequired(msg) => msg.clone(),
            AppError::Operation(msg) => msg.clone(),
            AppError::DataFetch(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Unauthorized {
                kind: Some(kind), ..
            } => Some(serde_json::json!({ "kind": kind.code() })),
            AppError::RateLimited(_) => {
                Some(serde_json::json!({ "kind": AuthErrorKind::RateLimited.code() }))
            }
            AppError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            AppError::DataFetch(_) => Some(serde_json::json!({ "retryable": true })),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: err.field(),
        }
    }
}

impl From<OperationError> for AppError {
    fn from(err: OperationError) -> Self {
        if let StoreError::NotFound { collection, id } = &err.source {
            return AppError::NotFound(format!("{} {} not found", collection, id));
        }
        tracing::error!("Store write failed: {:?}", err);
        AppError::Operation(err.to_string())
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(e) => e.into(),
            AdminError::Operation(e) => e.into(),
        }
    }
}

impl From<DataFetchError> for AppError {
    fn from(err: DataFetchError) -> Self {
        tracing::error!("Store read failed: {:?}", err);
        AppError::DataFetch(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err.kind {
            AuthErrorKind::RateLimited => AppError::RateLimited(err.to_string()),
            kind => AppError::Unauthorized {
                message: kind.message().to_string(),
                kind: Some(kind),
            },
        }
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details: error.details(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}
