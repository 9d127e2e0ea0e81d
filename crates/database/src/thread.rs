//! Assistant thread mapping persistence.

use sqlx::SqlitePool;

use crate::models::ThreadMapping;
use crate::Result;

/// Get the provider thread mapped to a (user, assistant) pair.
pub async fn get_thread(
    pool: &SqlitePool,
    user_id: &str,
    assistant_id: &str,
) -> Result<Option<ThreadMapping>> {
    let record = sqlx::query_as::<_, ThreadMapping>(
        r#"
        SELECT user_id, assistant_id, thread_id, created_at, updated_at
        FROM ai_threads
        WHERE user_id = ? AND assistant_id = ?
        "#,
    )
    .bind(user_id)
    .bind(assistant_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Create or replace the mapping for a (user, assistant) pair.
///
/// Concurrent writers race on the same slot; the last write wins.
pub async fn upsert_thread(
    pool: &SqlitePool,
    user_id: &str,
    assistant_id: &str,
    thread_id: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ai_threads (user_id, assistant_id, thread_id)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id, assistant_id) DO UPDATE SET
            thread_id = excluded.thread_id,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(assistant_id)
    .bind(thread_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the mapping. Returns whether a row was removed.
pub async fn delete_thread(pool: &SqlitePool, user_id: &str, assistant_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM ai_threads
        WHERE user_id = ? AND assistant_id = ?
        "#,
    )
    .bind(user_id)
    .bind(assistant_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
