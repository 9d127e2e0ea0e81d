//! Database models.

use coach_core::{ContextType, Language, Plan};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An application user, identified by the auth service's user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auth user id (e.g., "c27fb365-0c84-4cf2-8555-814bb065e448")
    pub id: String,
    /// Contact email, if known
    pub email: Option<String>,
    /// Preferred app language
    #[sqlx(try_from = "String")]
    pub language: Language,
    /// Subscription tier
    #[sqlx(try_from = "String")]
    pub plan: Plan,
}

/// Per-plan quota reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PlanLimit {
    /// Plan key.
    #[sqlx(try_from = "String")]
    pub key: Plan,
    /// Display name.
    pub name: String,
    /// Messages allowed per billing period; `None` means unlimited.
    pub message_limit_per_period: Option<i64>,
}

/// Per-user assistant message counter for the current billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UsageCounter {
    pub user_id: String,
    /// Messages successfully exchanged since `period_start`.
    pub messages_used_in_period: i64,
    /// When the counter was last reset.
    pub period_start: String,
}

/// Mapping from a (user, assistant) pair to a provider thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ThreadMapping {
    pub user_id: String,
    pub assistant_id: String,
    /// Opaque provider thread handle.
    pub thread_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A rolling conversation record, one per (user, thread).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub thread_id: String,
    #[sqlx(try_from = "String")]
    pub context_type: ContextType,
    pub title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields written when upserting a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub user_id: String,
    pub thread_id: String,
    pub context_type: ContextType,
    pub title: Option<String>,
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing ID.
    pub id: i64,
    pub conversation_id: String,
    pub user_id: String,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    /// JSON-encoded [`MessageMetadata`], if any.
    pub metadata: Option<String>,
    pub created_at: String,
}

impl Message {
    /// Decode the metadata column. Undecodable metadata reads as absent.
    pub fn metadata(&self) -> Option<MessageMetadata> {
        self.metadata
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Structured linkage stored alongside a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub context_type: ContextType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
}

/// A wellness life area (health, career, relationships, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LifeArea {
    pub id: String,
    pub key: String,
    pub name_en: String,
    pub name_he: String,
    pub description_en: Option<String>,
    pub description_he: Option<String>,
}

impl LifeArea {
    /// Localized display name.
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::He => &self.name_he,
            Language::En => &self.name_en,
        }
    }

    /// Localized description, if any.
    pub fn description(&self, language: Language) -> Option<&str> {
        match language {
            Language::He => self.description_he.as_deref(),
            Language::En => self.description_en.as_deref(),
        }
    }
}

/// A user's self-rating for a life area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LifeAreaScore {
    pub user_id: String,
    pub life_area_id: String,
    pub baseline_score: Option<i64>,
    pub current_score: Option<i64>,
}

/// A user goal inside a life area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub life_area_id: String,
    pub title: String,
    /// "active", "completed" or "archived".
    pub status: String,
    pub created_at: String,
}
