//! Conversation persistence.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{Conversation, NewConversation};

/// Create or update the conversation for a (user, thread) pair.
///
/// There is one rolling record per pair: context type and title are
/// overwritten on every call and the existing id is kept. Returns the id.
pub async fn upsert_conversation(pool: &SqlitePool, conversation: &NewConversation) -> Result<String> {
    let id = sqlx::query_scalar::<_, String>(
        r#"
        INSERT INTO ai_conversations (id, user_id, thread_id, context_type, title)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id, thread_id) DO UPDATE SET
            context_type = excluded.context_type,
            title = excluded.title,
            updated_at = datetime('now')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&conversation.user_id)
    .bind(&conversation.thread_id)
    .bind(conversation.context_type.as_str())
    .bind(&conversation.title)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Get a conversation by ID.
pub async fn get_conversation(pool: &SqlitePool, id: &str) -> Result<Conversation> {
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, user_id, thread_id, context_type, title, created_at, updated_at
        FROM ai_conversations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Conversation",
        id: id.to_string(),
    })
}

/// List a user's conversations, most recently updated first.
pub async fn list_conversations(pool: &SqlitePool, user_id: &str) -> Result<Vec<Conversation>> {
    let records = sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, user_id, thread_id, context_type, title, created_at, updated_at
        FROM ai_conversations
        WHERE user_id = ?
        ORDER BY updated_at DESC, id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
