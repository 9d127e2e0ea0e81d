//! Conversation persistence: store the exchange, then charge the quota.

use coach_core::ContextType;
use database::{conversation, message, Database, MessageMetadata, NewConversation};
use tracing::{error, info};

use crate::error::Result;
use crate::quota::QuotaLedger;

/// Longest conversation title, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Conversation linkage for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMeta {
    pub thread_id: String,
    pub context_type: ContextType,
    pub life_area_id: Option<String>,
    pub goal_id: Option<String>,
}

impl ConversationMeta {
    fn metadata(&self) -> MessageMetadata {
        MessageMetadata {
            context_type: self.context_type,
            life_area_id: self.life_area_id.clone(),
            goal_id: self.goal_id.clone(),
        }
    }
}

/// Outcome of a stored exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExchange {
    pub conversation_id: String,
    /// Usage after the charge; `None` if the messages were stored but the
    /// charge itself failed.
    pub messages_used: Option<i64>,
}

/// Conversation title: the user's message cut to [`TITLE_MAX_CHARS`].
pub fn derive_title(message: &str) -> String {
    message.chars().take(TITLE_MAX_CHARS).collect()
}

/// Writes the conversation row and message pair for an exchange.
#[derive(Debug, Clone)]
pub struct ConversationRecorder {
    db: Database,
    ledger: QuotaLedger,
}

impl ConversationRecorder {
    pub fn new(db: Database, ledger: QuotaLedger) -> Self {
        Self { db, ledger }
    }

    /// Store one completed exchange and charge it.
    ///
    /// Messages are written before the counter is touched. Any failure up to
    /// and including the message insert returns an error with nothing
    /// charged; a failed charge after the insert is logged and reported
    /// through [`RecordedExchange::messages_used`].
    pub async fn record_exchange(
        &self,
        user_id: &str,
        meta: &ConversationMeta,
        user_text: &str,
        assistant_text: &str,
    ) -> Result<RecordedExchange> {
        let conversation_id = conversation::upsert_conversation(
            self.db.pool(),
            &NewConversation {
                user_id: user_id.to_string(),
                thread_id: meta.thread_id.clone(),
                context_type: meta.context_type,
                title: Some(derive_title(user_text)),
            },
        )
        .await?;

        message::insert_exchange(
            self.db.pool(),
            &conversation_id,
            user_id,
            user_text,
            Some(&meta.metadata()),
            assistant_text,
        )
        .await?;

        let messages_used = match self.ledger.increment(user_id).await {
            Ok(used) => Some(used),
            Err(e) => {
                error!(user_id, conversation_id = %conversation_id, error = %e, "Failed to charge exchange");
                None
            }
        };

        info!(
            user_id,
            conversation_id = %conversation_id,
            context_type = %meta.context_type,
            "Recorded exchange"
        );

        Ok(RecordedExchange {
            conversation_id,
            messages_used,
        })
    }
}
