//! Goal persistence.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::Goal;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";

/// Create an active goal. Returns its id.
pub async fn create_goal(
    pool: &SqlitePool,
    user_id: &str,
    life_area_id: &str,
    title: &str,
) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO goals (id, user_id, life_area_id, title, status)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(life_area_id)
    .bind(title)
    .bind(STATUS_ACTIVE)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Change a goal's status.
pub async fn set_status(pool: &SqlitePool, id: &str, status: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE goals SET status = ? WHERE id = ?
        "#,
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Goal",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// List a user's goals in a life area.
pub async fn list_goals(pool: &SqlitePool, user_id: &str, life_area_id: &str) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(
        r#"
        SELECT id, user_id, life_area_id, title, status, created_at
        FROM goals
        WHERE user_id = ? AND life_area_id = ?
        ORDER BY created_at, id
        "#,
    )
    .bind(user_id)
    .bind(life_area_id)
    .fetch_all(pool)
    .await?;

    Ok(goals)
}

/// Titles of the user's active goals in a life area.
pub async fn active_goal_titles(
    pool: &SqlitePool,
    user_id: &str,
    life_area_id: &str,
) -> Result<Vec<String>> {
    Ok(list_goals(pool, user_id, life_area_id)
        .await?
        .into_iter()
        .filter(|goal| goal.status == STATUS_ACTIVE)
        .map(|goal| goal.title)
        .collect())
}
