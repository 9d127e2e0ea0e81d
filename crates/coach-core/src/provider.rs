//! Provider traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::ProviderError;

/// Lifecycle state of an assistant run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// The run finished and a reply is available.
    pub fn is_success(self) -> bool {
        self == RunStatus::Completed
    }

    /// The run ended without producing a reply. Never retried.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired | RunStatus::Incomplete
        )
    }

    /// Whether polling can stop.
    pub fn is_terminal(self) -> bool {
        self.is_success() || self.is_failure()
    }
}

/// Handle returned when a run is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    /// Provider-issued run identifier.
    pub id: String,
    /// Status reported at creation time.
    pub status: RunStatus,
}

/// A message read back from a provider thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    /// "user" or "assistant".
    pub role: String,
    /// Concatenated text content.
    pub text: String,
}

impl ThreadMessage {
    /// Whether this message was produced by the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

/// A job-based assistant API with durable conversation threads.
///
/// Replies are never returned directly: a message is appended to a thread,
/// a run is started against the thread, and the run is polled until it
/// reaches a terminal state. This trait is object-safe and can be used with
/// `Arc<dyn AssistantProvider>`.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Allocate a new, empty conversation thread.
    async fn create_thread(&self) -> Result<String, ProviderError>;

    /// Append a user message to a thread.
    ///
    /// Returns [`ProviderError::NotFound`] when the thread no longer exists.
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), ProviderError>;

    /// Start generating a reply against the full thread history.
    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunHandle, ProviderError>;

    /// Fetch the current status of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ProviderError>;

    /// Fetch the most recent message in a thread.
    async fn latest_message(&self, thread_id: &str)
        -> Result<Option<ThreadMessage>, ProviderError>;

    /// Get a human-readable name for this provider.
    fn name(&self) -> &str;
}

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a request with no sampling overrides.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A request/response chat-completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single reply for the request.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}
