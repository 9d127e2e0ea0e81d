//! Life area and score lookups.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{LifeArea, LifeAreaScore};

/// Insert a life area.
pub async fn create_life_area(pool: &SqlitePool, area: &LifeArea) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO life_areas (id, key, name_en, name_he, description_en, description_he)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&area.id)
    .bind(&area.key)
    .bind(&area.name_en)
    .bind(&area.name_he)
    .bind(&area.description_en)
    .bind(&area.description_he)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a life area by ID.
pub async fn get_life_area(pool: &SqlitePool, id: &str) -> Result<LifeArea> {
    sqlx::query_as::<_, LifeArea>(
        r#"
        SELECT id, key, name_en, name_he, description_en, description_he
        FROM life_areas
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Life area",
        id: id.to_string(),
    })
}

/// Create or update a user's score for a life area.
pub async fn upsert_score(
    pool: &SqlitePool,
    user_id: &str,
    life_area_id: &str,
    baseline_score: Option<i64>,
    current_score: Option<i64>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO life_area_scores (user_id, life_area_id, baseline_score, current_score)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(user_id, life_area_id) DO UPDATE SET
            baseline_score = excluded.baseline_score,
            current_score = excluded.current_score,
            updated_at = datetime('now')
        "#,
    )
    .bind(user_id)
    .bind(life_area_id)
    .bind(baseline_score)
    .bind(current_score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user's score for a life area.
pub async fn get_score(
    pool: &SqlitePool,
    user_id: &str,
    life_area_id: &str,
) -> Result<Option<LifeAreaScore>> {
    let record = sqlx::query_as::<_, LifeAreaScore>(
        r#"
        SELECT user_id, life_area_id, baseline_score, current_score
        FROM life_area_scores
        WHERE user_id = ? AND life_area_id = ?
        "#,
    )
    .bind(user_id)
    .bind(life_area_id)
    .fetch_optional(pool)
    .await?;

    Ok(record)
}
