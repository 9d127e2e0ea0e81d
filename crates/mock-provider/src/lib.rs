//! Mock provider implementations for testing the coach pipeline.
//!
//! [`ScriptedProvider`] implements both `AssistantProvider` and
//! `CompletionProvider` entirely in memory:
//! - threads are allocated with sequential ids and can be expired to
//!   simulate provider-side loss
//! - run statuses are replayed from a script
//! - every call is counted so tests can assert that no provider traffic
//!   happened
//!
//! For production, use the `openai-assistant` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{AssistantProvider, RunStatus, ScriptedProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_provider::ProviderError> {
//!     let provider = ScriptedProvider::new()
//!         .with_reply("Try a consistent bedtime.")
//!         .with_run_statuses([RunStatus::InProgress, RunStatus::Completed]);
//!
//!     let thread = provider.create_thread().await?;
//!     provider.add_message(&thread, "How do I sleep better?").await?;
//!     assert_eq!(provider.calls().create_thread, 1);
//!     Ok(())
//! }
//! ```

mod scripted;

pub use coach_core::{
    async_trait, AssistantProvider, CompletionProvider, CompletionRequest, ProviderError,
    RunHandle, RunStatus, ThreadMessage,
};

pub use scripted::{CallCounts, ScriptedProvider};
