//! Shared fixtures for unit tests.

use coach_core::{Language, Plan};
use database::{models::User, usage, user, Database};

pub const USER_ID: &str = "user-1";

/// A migrated in-memory database holding one user with `used` messages
/// already counted.
pub async fn db_with_user(plan: Plan, used: i64) -> (Database, String) {
    let db = Database::in_memory().await.unwrap();
    user::create_user(
        db.pool(),
        &User {
            id: USER_ID.to_string(),
            email: None,
            language: Language::En,
            plan,
        },
    )
    .await
    .unwrap();
    if used > 0 {
        usage::set_messages_used(db.pool(), USER_ID, used)
            .await
            .unwrap();
    }
    (db, USER_ID.to_string())
}
