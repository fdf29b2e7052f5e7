use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repository::StoreError;

/// ApiError
///
/// The full error taxonomy of the service, mapped onto HTTP status codes by the
/// `IntoResponse` impl. Every handler and service returns `Result<_, ApiError>`,
/// so a single conversion point controls what clients see: a `{message}` JSON body,
/// plus a machine-readable `error` code for the reportable no-data condition.
///
/// Authorization and not-found checks run before any mutation, so a denied request
/// never leaves a partial write behind.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, signature-invalid, or expired token (401).
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Credential verification failed (401). Distinct from `Unauthenticated` so the
    /// login and change-credential flows can phrase the message per the caller.
    #[error("{0}")]
    InvalidCredentials(&'static str),

    /// Valid principal, insufficient rights (403).
    #[error("{0}")]
    Forbidden(&'static str),

    /// Resource absent (404).
    #[error("{0}")]
    NotFound(&'static str),

    /// Uniqueness violation (400, matching the original wire behavior).
    #[error("{0}")]
    Conflict(&'static str),

    /// Reportable, non-fatal "nothing to aggregate" condition (404 + error code),
    /// distinguishable from a server error.
    #[error("{message}")]
    NoData { message: String, code: &'static str },

    /// Persistence failure (500). Never retried; surfaced as an opaque message while
    /// the underlying cause goes to the logs only.
    #[error("Error saving data")]
    Storage(#[from] StoreError),

    /// Password hashing failure (500).
    #[error("Internal server error")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Token signing failure (500). Decode failures are mapped to `Unauthenticated`
    /// at the extractor instead.
    #[error("Internal server error")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::NoData { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Hashing(_) | ApiError::Token(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail is logged, never sent to the client.
        match &self {
            ApiError::Storage(cause) => tracing::error!("storage failure: {cause}"),
            ApiError::Hashing(cause) => tracing::error!("password hashing failure: {cause}"),
            ApiError::Token(cause) => tracing::error!("token signing failure: {cause}"),
            _ => {}
        }

        let body = match &self {
            ApiError::NoData { message, code } => json!({ "message": message, "error": code }),
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
