//! Thread registry: one durable provider thread per (user, assistant).

use std::sync::Arc;

use coach_core::AssistantProvider;
use database::{thread, Database};
use tracing::{info, warn};

use crate::error::Result;

/// A resolved provider thread for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadRef {
    pub user_id: String,
    pub assistant_id: String,
    pub thread_id: String,
    /// Whether the thread was allocated by this call.
    pub created: bool,
}

/// Maps each (user, assistant) pair to a provider thread, allocating one on
/// first use.
#[derive(Clone)]
pub struct ThreadRegistry {
    db: Database,
    provider: Arc<dyn AssistantProvider>,
}

impl ThreadRegistry {
    pub fn new(db: Database, provider: Arc<dyn AssistantProvider>) -> Self {
        Self { db, provider }
    }

    /// Return the mapped thread, creating and recording one if none exists.
    ///
    /// Two concurrent first calls for the same pair may both allocate; the
    /// later write wins and the other provider thread is orphaned.
    pub async fn get_or_create(&self, user_id: &str, assistant_id: &str) -> Result<ThreadRef> {
        if let Some(mapping) = thread::get_thread(self.db.pool(), user_id, assistant_id).await? {
            return Ok(ThreadRef {
                user_id: mapping.user_id,
                assistant_id: mapping.assistant_id,
                thread_id: mapping.thread_id,
                created: false,
            });
        }

        let thread_id = self.provider.create_thread().await?;
        thread::upsert_thread(self.db.pool(), user_id, assistant_id, &thread_id).await?;

        info!(
            user_id,
            assistant_id,
            thread_id = %thread_id,
            provider = self.provider.name(),
            "Allocated assistant thread"
        );

        Ok(ThreadRef {
            user_id: user_id.to_string(),
            assistant_id: assistant_id.to_string(),
            thread_id,
            created: true,
        })
    }

    /// Forget the mapping so the next exchange allocates a fresh thread.
    /// Removing an absent mapping is not an error.
    pub async fn invalidate(&self, user_id: &str, assistant_id: &str) -> Result<()> {
        let removed = thread::delete_thread(self.db.pool(), user_id, assistant_id).await?;
        if removed {
            warn!(user_id, assistant_id, "Discarded expired assistant thread");
        }
        Ok(())
    }
}

impl std::fmt::Debug for ThreadRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadRegistry")
            .field("provider", &self.provider.name())
            .finish()
    }
}
