//! Usage counter persistence.

use sqlx::SqlitePool;

use crate::models::UsageCounter;
use crate::Result;

/// Get the usage counter row for a user, if one exists.
pub async fn get_usage(pool: &SqlitePool, user_id: &str) -> Result<Option<UsageCounter>> {
    let record = sqlx::query_as::<_, UsageCounter>(
        r#"
        SELECT user_id, messages_used_in_period, period_start
        FROM usage_counters
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Messages used in the current period (0 when no counter exists yet).
pub async fn messages_used(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    Ok(get_usage(pool, user_id)
        .await?
        .map(|counter| counter.messages_used_in_period)
        .unwrap_or(0))
}

/// Add exactly one message to the user's counter, creating it if needed.
///
/// Returns the new count.
pub async fn increment_usage(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let used = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usage_counters (user_id, messages_used_in_period)
        VALUES (?, 1)
        ON CONFLICT(user_id) DO UPDATE SET
            messages_used_in_period = usage_counters.messages_used_in_period + 1,
            updated_at = datetime('now')
        RETURNING messages_used_in_period
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(used)
}

/// Overwrite the counter. Used by period-reset jobs and seeding.
pub async fn set_messages_used(pool: &SqlitePool, user_id: &str, used: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO usage_counters (user_id, messages_used_in_period)
        VALUES (?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            messages_used_in_period = excluded.messages_used_in_period,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(used)
    .execute(pool)
    .await?;

    Ok(())
}
