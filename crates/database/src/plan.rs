//! Plan limit reference data.

use coach_core::Plan;
use sqlx::SqlitePool;

use crate::models::PlanLimit;
use crate::Result;

/// Get the limits configured for a plan.
pub async fn get_plan_limit(pool: &SqlitePool, plan: Plan) -> Result<Option<PlanLimit>> {
    let record = sqlx::query_as::<_, PlanLimit>(
        r#"
        SELECT key, name, message_limit_per_period
        FROM subscription_plans
        WHERE key = ?
        "#,
    )
    .bind(plan.as_str())
    .fetch_optional(pool)
    .await?;

    Ok(record)
}

/// Set the per-period message limit for a plan (`None` for unlimited).
pub async fn set_message_limit(pool: &SqlitePool, plan: Plan, limit: Option<i64>) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE subscription_plans
        SET message_limit_per_period = ?, updated_at = datetime('now')
        WHERE key = ?
        "#,
    )
    .bind(limit)
    .bind(plan.as_str())
    .execute(pool)
    .await?;

    Ok(())
}
