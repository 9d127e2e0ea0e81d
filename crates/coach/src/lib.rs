//! AI coaching conversation pipeline.
//!
//! This crate provides the [`ChatPipeline`] type, which turns one user
//! message into one assistant reply against a job-based assistant provider,
//! plus the [`GoalSuggester`] for one-shot SMART goal generation.
//!
//! # Architecture
//!
//! ```text
//! ChatRequest (authenticated user id)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CHAT PIPELINE                         │
//! │                                                             │
//! │  1. Validate request, load user and plan                    │
//! │         ↓                                                   │
//! │  2. QuotaLedger::check_and_peek   → QuotaExceeded (402)     │
//! │         ↓                                                   │
//! │  3. ThreadRegistry::get_or_create (one thread per           │
//! │     user + assistant, allocated lazily)                     │
//! │         ↓                                                   │
//! │  4. RunOrchestrator::run_exchange                           │
//! │     • add message   → 404 → invalidate → ThreadExpired      │
//! │     • create run                                            │
//! │     • poll every interval, up to max_attempts               │
//! │     • fetch latest assistant message                        │
//! │         ↓                                                   │
//! │  5. ConversationRecorder::record_exchange                   │
//! │     • upsert conversation, append user + assistant rows     │
//! │     • QuotaLedger::increment (+1)                           │
//! │         ↓                                                   │
//! │  6. ChatResponse { reply, conversation id, remaining }      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! All shared state lives in the row store; nothing is cached in process
//! between exchanges.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coach::{ChatPipeline, PipelineConfig};
//! use coach_core::{wire::ChatRequest, ContextType, Language};
//!
//! let db = database::Database::connect("sqlite:coach.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let provider = Arc::new(openai_assistant::OpenAiClient::from_env()?);
//! let pipeline = ChatPipeline::new(db, provider, PipelineConfig::new("asst_abc123"));
//!
//! let request = ChatRequest::new("How do I sleep better?", ContextType::General, Language::En);
//! let response = pipeline.handle("user-id", &request).await?;
//! println!("{} ({} left)", response.assistant_message, response.remaining_free_messages);
//! ```

pub mod error;
pub mod localized;
pub mod persistence;
pub mod pipeline;
pub mod quota;
pub mod runner;
pub mod suggestions;
pub mod threads;

#[cfg(test)]
mod test_support;

pub use error::{ChatError, Result};
pub use persistence::{derive_title, ConversationMeta, ConversationRecorder, RecordedExchange};
pub use pipeline::{ChatPipeline, PipelineConfig};
pub use quota::{QuotaLedger, QuotaSnapshot};
pub use runner::{tag_message, PollPolicy, RunOrchestrator};
pub use suggestions::GoalSuggester;
pub use threads::{ThreadRef, ThreadRegistry};
