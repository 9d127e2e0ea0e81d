//! Core traits and types for the wellness coach services.
//!
//! This crate provides the shared vocabulary used by the server pipeline,
//! the provider clients and the chat client. It defines:
//!
//! - [`AssistantProvider`] - The job-based assistant API (threads, messages, runs)
//! - [`CompletionProvider`] - One-shot chat completions (goal suggestions)
//! - [`ProviderError`] - Error types for provider calls
//! - [`Plan`] / [`Language`] / [`ContextType`] - Closed request vocabularies
//! - [`wire`] - JSON bodies shared by the API server and the chat client
//!
//! # Example
//!
//! ```rust
//! use coach_core::{async_trait, AssistantProvider, ProviderError, RunHandle, RunStatus, ThreadMessage};
//!
//! struct Silent;
//!
//! #[async_trait]
//! impl AssistantProvider for Silent {
//!     async fn create_thread(&self) -> Result<String, ProviderError> {
//!         Ok("thread_1".to_string())
//!     }
//!
//!     async fn add_message(&self, _thread_id: &str, _content: &str) -> Result<(), ProviderError> {
//!         Ok(())
//!     }
//!
//!     async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<RunHandle, ProviderError> {
//!         Ok(RunHandle { id: "run_1".to_string(), status: RunStatus::Queued })
//!     }
//!
//!     async fn get_run(&self, _thread_id: &str, _run_id: &str) -> Result<RunStatus, ProviderError> {
//!         Ok(RunStatus::Completed)
//!     }
//!
//!     async fn latest_message(&self, _thread_id: &str) -> Result<Option<ThreadMessage>, ProviderError> {
//!         Ok(None)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Silent"
//!     }
//! }
//! ```

mod error;
mod provider;
mod types;
pub mod wire;

pub use error::ProviderError;
pub use provider::{
    AssistantProvider, CompletionProvider, CompletionRequest, RunHandle, RunStatus, ThreadMessage,
};
pub use types::{ContextType, Language, Plan, UNLIMITED_MESSAGES};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
