//! Error types for chat exchanges.

use coach_core::{Plan, ProviderError, RunStatus};
use database::DatabaseError;
use thiserror::Error;

/// Every way a chat exchange or suggestion request can end without a reply.
///
/// Callers match on the variant; none of these carry control flow in their
/// message text.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request body is missing required content.
    #[error("{0}")]
    InvalidRequest(String),

    /// The authenticated caller has no user row.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A referenced record (life area, ...) does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The free-tier quota for this period is used up.
    #[error("AI message limit reached for plan {plan}")]
    QuotaExceeded { plan: Plan, message: String },

    /// The provider no longer knows the mapped thread. The mapping has been
    /// removed; a fresh attempt allocates a new thread.
    #[error("conversation thread expired")]
    ThreadExpired,

    /// The provider ended the run without a reply.
    #[error("Run failed with status: {0}")]
    RunFailed(RunStatus),

    /// The run did not finish within the poll budget.
    #[error("Run timeout after {attempts} status checks - please try again")]
    Timeout { attempts: u32 },

    /// The model's answer could not be interpreted.
    #[error("Failed to parse AI response. Please try again.")]
    UnparseableReply(String),

    /// Provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Row store call failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Result type for chat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
