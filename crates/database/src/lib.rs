//! SQLite persistence layer for the wellness coach.
//!
//! This crate provides async row-store operations for users, plan limits,
//! usage counters, assistant thread mappings, conversations and messages
//! using SQLx with SQLite. Every operation is a point read/write or an
//! upsert keyed on a natural key; there are no cross-call transactions.
//!
//! # Example
//!
//! ```no_run
//! use coach_core::{Language, Plan};
//! use database::{models::User, usage, user, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:coach.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a user
//!     let user = User {
//!         id: "c27fb365-0c84-4cf2-8555-814bb065e448".to_string(),
//!         email: Some("dana@example.com".to_string()),
//!         language: Language::He,
//!         plan: Plan::Free,
//!     };
//!     user::create_user(db.pool(), &user).await?;
//!
//!     let used = usage::messages_used(db.pool(), &user.id).await?;
//!     assert_eq!(used, 0);
//!
//!     Ok(())
//! }
//! ```

pub mod conversation;
pub mod error;
pub mod goal;
pub mod life_area;
pub mod message;
pub mod models;
pub mod plan;
pub mod thread;
pub mod usage;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{
    Conversation, Goal, LifeArea, LifeAreaScore, Message, MessageMetadata, NewConversation,
    PlanLimit, ThreadMapping, UsageCounter, User,
};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Each in-flight chat exchange holds at most one connection at a time.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// let db = database::Database::connect("sqlite:data/coach.db?mode=rwc").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Open a migrated in-memory database.
    ///
    /// The pool is capped at a single connection so every query sees the
    /// same memory database.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect_with_pool_size("sqlite::memory:", 1).await?;
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
