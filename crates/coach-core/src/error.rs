//! Error types for provider calls.

use thiserror::Error;

/// Errors that can occur while talking to an AI provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The referenced resource (thread, run) does not exist on the provider.
    #[error("not found: {0}")]
    NotFound(String),

    /// The provider answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a body that does not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Client configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProviderError {
    /// Whether the provider reported the resource as gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}
