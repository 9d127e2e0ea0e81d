//! OpenAI client for the wellness coach.
//!
//! This crate implements the provider traits from `coach-core` on top of
//! the OpenAI HTTP API:
//!
//! - [`AssistantProvider`] via the Assistants v2 endpoints (threads,
//!   messages, runs)
//! - [`CompletionProvider`] via chat completions
//!
//! Every response is decoded into an explicit boundary type; a body that does
//! not match is reported as [`ProviderError::MalformedResponse`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use openai_assistant::{OpenAiClient, AssistantConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AssistantConfig::from_env()?;
//!     let client = OpenAiClient::new(config)?;
//!     // Use the client...
//!     Ok(())
//! }
//! ```

mod api_types;
mod client;
mod config;

pub use client::OpenAiClient;
pub use config::{AssistantConfig, AssistantConfigBuilder};

// Re-export coach-core types for convenience
pub use coach_core::{
    AssistantProvider, CompletionProvider, CompletionRequest, ProviderError, RunHandle, RunStatus,
    ThreadMessage,
};
