//! Error types for the chat client.

use coach_core::Plan;
use thiserror::Error;

/// Errors that can occur when talking to the coach API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed or the body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No signed-in user, or the server rejected the token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The free quota is used up; route the user to the upgrade flow.
    #[error("AI_LIMIT_REACHED")]
    LimitReached { message: String, plan: Option<Plan> },

    /// The server discarded the conversation thread; resending starts a new
    /// one.
    #[error("{message}")]
    ThreadExpired { message: String },

    /// Any other non-success response.
    #[error("{error}")]
    Server { status: u16, error: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the caller should show the upgrade surface.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, ClientError::LimitReached { .. })
    }
}
