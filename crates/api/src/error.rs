//! Error types for the API server.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coach::{localized, ChatError};
use coach_core::wire::{ErrorBody, AI_LIMIT_REACHED, THREAD_EXPIRED};
use coach_core::Language;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::AuthError;

/// Errors returned by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// The auth service itself failed.
    #[error("auth service unavailable")]
    AuthUnavailable(String),

    /// The provider thread was discarded; the reply message is localized.
    #[error("conversation thread expired")]
    ThreadExpired(Language),

    /// Pipeline failure.
    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl ApiError {
    /// Wrap a pipeline error, keeping the caller's language for messages
    /// that are shown to the user.
    pub fn from_chat(err: ChatError, language: Language) -> Self {
        match err {
            ChatError::ThreadExpired => ApiError::ThreadExpired(language),
            other => ApiError::Chat(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unavailable(reason) => ApiError::AuthUnavailable(reason),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized(message) => {
                warn!(reason = %message, "Unauthorized request");
                (StatusCode::UNAUTHORIZED, ErrorBody::new(message))
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody::new(message)),
            ApiError::AuthUnavailable(reason) => {
                error!(reason = %reason, "Auth service error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Authentication service unavailable"),
                )
            }
            ApiError::ThreadExpired(language) => (
                StatusCode::GONE,
                ErrorBody::new(THREAD_EXPIRED).with_message(localized::thread_expired(language)),
            ),
            ApiError::Chat(err) => chat_error_response(err),
        };

        (status, Json(body)).into_response()
    }
}

fn chat_error_response(err: ChatError) -> (StatusCode, ErrorBody) {
    match err {
        ChatError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, ErrorBody::new(message)),
        ChatError::UserNotFound(_) => (StatusCode::NOT_FOUND, ErrorBody::new("User not found")),
        ChatError::NotFound(message) => (StatusCode::NOT_FOUND, ErrorBody::new(message)),
        ChatError::QuotaExceeded { plan, message } => {
            let mut body = ErrorBody::new(AI_LIMIT_REACHED).with_message(message);
            body.plan = Some(plan);
            body.remaining_free_messages = Some(0);
            (StatusCode::PAYMENT_REQUIRED, body)
        }
        ChatError::ThreadExpired => (
            StatusCode::GONE,
            ErrorBody::new(THREAD_EXPIRED).with_message(localized::thread_expired(Language::En)),
        ),
        ChatError::Database(err) => {
            error!(error = %err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Internal server error"),
            )
        }
        other => {
            error!(error = %other, "Chat request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(other.to_string()))
        }
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
