//! Chat message persistence. Messages are append-only.

use sqlx::SqlitePool;

use crate::models::{Message, MessageMetadata};
use crate::Result;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Append a user message and the assistant reply to a conversation.
///
/// Both rows are written in one transaction, user first.
pub async fn insert_exchange(
    pool: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
    user_text: &str,
    metadata: Option<&MessageMetadata>,
    assistant_text: &str,
) -> Result<()> {
    let metadata = metadata.map(serde_json::to_string).transpose()?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO ai_messages (conversation_id, user_id, role, content, metadata)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(ROLE_USER)
    .bind(user_text)
    .bind(metadata)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO ai_messages (conversation_id, user_id, role, content, metadata)
        VALUES (?, ?, ?, ?, NULL)
        "#,
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(ROLE_ASSISTANT)
    .bind(assistant_text)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(())
}

/// List the messages of a conversation in insertion order.
pub async fn list_messages(pool: &SqlitePool, conversation_id: &str) -> Result<Vec<Message>> {
    let records = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, conversation_id, user_id, role, content, metadata, created_at
        FROM ai_messages
        WHERE conversation_id = ?
        ORDER BY id
        "#,
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Count all messages stored for a user.
pub async fn count_messages_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM ai_messages WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
