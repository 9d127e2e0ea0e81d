//! The chat exchange pipeline.

use std::sync::Arc;

use coach_core::wire::{ChatRequest, ChatResponse, UsageResponse};
use coach_core::{AssistantProvider, Plan};
use database::{user, Database, DatabaseError, User};
use tracing::{error, info, warn};

use crate::error::{ChatError, Result};
use crate::localized;
use crate::persistence::{ConversationMeta, ConversationRecorder};
use crate::quota::QuotaLedger;
use crate::runner::{PollPolicy, RunOrchestrator};
use crate::threads::ThreadRegistry;

/// Settings fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Provider assistant every exchange runs against.
    pub assistant_id: String,
    pub poll: PollPolicy,
}

impl PipelineConfig {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

/// Composes quota, threads, runs and persistence into one exchange.
///
/// Cheap to clone; every exchange reads shared state fresh from the row
/// store.
#[derive(Debug, Clone)]
pub struct ChatPipeline {
    db: Database,
    assistant_id: String,
    ledger: QuotaLedger,
    threads: ThreadRegistry,
    runner: RunOrchestrator,
    recorder: ConversationRecorder,
}

impl ChatPipeline {
    pub fn new(db: Database, provider: Arc<dyn AssistantProvider>, config: PipelineConfig) -> Self {
        let ledger = QuotaLedger::new(db.clone());
        let threads = ThreadRegistry::new(db.clone(), provider.clone());
        let runner = RunOrchestrator::new(provider, threads.clone(), config.poll);
        let recorder = ConversationRecorder::new(db.clone(), ledger.clone());

        Self {
            db,
            assistant_id: config.assistant_id,
            ledger,
            threads,
            runner,
            recorder,
        }
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// Handle one chat exchange for an authenticated user.
    ///
    /// The quota is checked before any provider call. A reply obtained from
    /// the provider is returned even if storing it fails; in that case the
    /// response carries no conversation id and nothing is charged.
    pub async fn handle(&self, user_id: &str, request: &ChatRequest) -> Result<ChatResponse> {
        if request.message.trim().is_empty() {
            return Err(ChatError::InvalidRequest("Message is required".to_string()));
        }

        let user = self.load_user(user_id).await?;

        let quota = self.ledger.check_and_peek(user_id, user.plan).await?;
        if quota.blocked {
            return Err(ChatError::QuotaExceeded {
                plan: user.plan,
                message: localized::quota_reached(request.language, quota.limit.unwrap_or(0)),
            });
        }

        let thread = self
            .threads
            .get_or_create(user_id, &self.assistant_id)
            .await?;

        let reply = self
            .runner
            .run_exchange(&thread, &request.message, request.language)
            .await?;

        let meta = ConversationMeta {
            thread_id: thread.thread_id.clone(),
            context_type: request.context_type,
            life_area_id: request.life_area_id.clone(),
            goal_id: request.goal_id.clone(),
        };

        let (conversation_id, used) = match self
            .recorder
            .record_exchange(user_id, &meta, &request.message, &reply)
            .await
        {
            Ok(recorded) => (
                Some(recorded.conversation_id),
                recorded.messages_used.unwrap_or(quota.used),
            ),
            Err(e) => {
                error!(user_id, thread_id = %thread.thread_id, error = %e, "Failed to store exchange");
                (None, quota.used)
            }
        };

        let remaining = quota.remaining_at(used);
        info!(user_id, plan = %user.plan, remaining, "Chat exchange complete");

        Ok(ChatResponse {
            assistant_message: reply,
            conversation_id,
            plan: user.plan,
            remaining_free_messages: remaining,
        })
    }

    /// Current plan usage for a user.
    pub async fn usage(&self, user_id: &str) -> Result<UsageResponse> {
        let user = self.load_user(user_id).await?;
        let quota = self.ledger.check_and_peek(user_id, user.plan).await?;

        Ok(UsageResponse {
            plan: user.plan,
            used: quota.used,
            limit: quota.limit,
            remaining_free_messages: quota.remaining(),
        })
    }

    /// The user's plan, for callers that only need the tier.
    pub async fn plan(&self, user_id: &str) -> Result<Plan> {
        Ok(self.load_user(user_id).await?.plan)
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        match user::get_user(self.db.pool(), user_id).await {
            Ok(user) => Ok(user),
            Err(DatabaseError::NotFound { .. }) => {
                warn!(user_id, "Authenticated caller has no user row");
                Err(ChatError::UserNotFound(user_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::db_with_user;
    use coach_core::{ContextType, Language};
    use mock_provider::ScriptedProvider;
    use std::time::Duration;

    fn pipeline(db: Database, provider: Arc<ScriptedProvider>) -> ChatPipeline {
        ChatPipeline::new(
            db,
            provider,
            PipelineConfig::new("asst_coach").with_poll(PollPolicy::new(Duration::from_millis(1), 3)),
        )
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected_first() {
        let (db, user_id) = db_with_user(Plan::Free, 0).await;
        let provider = Arc::new(ScriptedProvider::new());
        let pipeline = pipeline(db, provider.clone());

        let request = ChatRequest::new("   ", ContextType::General, Language::En);
        let result = pipeline.handle(&user_id, &request).await;
        assert!(matches!(result, Err(ChatError::InvalidRequest(_))));
        assert_eq!(provider.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (db, _) = db_with_user(Plan::Free, 0).await;
        let provider = Arc::new(ScriptedProvider::new());
        let pipeline = pipeline(db, provider.clone());

        let request = ChatRequest::new("hello", ContextType::General, Language::En);
        let result = pipeline.handle("someone-else", &request).await;
        assert!(matches!(result, Err(ChatError::UserNotFound(id)) if id == "someone-else"));
        assert_eq!(provider.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_quota_message_is_localized() {
        let (db, user_id) = db_with_user(Plan::Free, 5).await;
        let pipeline = pipeline(db, Arc::new(ScriptedProvider::new()));

        let request = ChatRequest::new("שלום", ContextType::General, Language::He);
        match pipeline.handle(&user_id, &request).await {
            Err(ChatError::QuotaExceeded { plan, message }) => {
                assert_eq!(plan, Plan::Free);
                assert_eq!(message, localized::quota_reached(Language::He, 5));
            }
            other => panic!("expected quota error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_usage_reports_remaining() {
        let (db, user_id) = db_with_user(Plan::Free, 2).await;
        let pipeline = pipeline(db, Arc::new(ScriptedProvider::new()));

        let usage = pipeline.usage(&user_id).await.unwrap();
        assert_eq!(usage.plan, Plan::Free);
        assert_eq!(usage.used, 2);
        assert_eq!(usage.limit, Some(5));
        assert_eq!(usage.remaining_free_messages, 3);
    }

    #[tokio::test]
    async fn test_usage_premium_is_unlimited() {
        let (db, user_id) = db_with_user(Plan::Premium, 12).await;
        let pipeline = pipeline(db, Arc::new(ScriptedProvider::new()));

        let usage = pipeline.usage(&user_id).await.unwrap();
        assert_eq!(usage.limit, None);
        assert_eq!(usage.remaining_free_messages, -1);
        assert_eq!(pipeline.plan(&user_id).await.unwrap(), Plan::Premium);
    }

    #[tokio::test]
    async fn test_reply_survives_storage_failure() {
        let (db, user_id) = db_with_user(Plan::Free, 1).await;
        let provider = Arc::new(ScriptedProvider::new().with_reply("Drink water."));
        let pipeline = pipeline(db.clone(), provider);

        sqlx::query("DROP TABLE ai_messages")
            .execute(db.pool())
            .await
            .unwrap();

        let request = ChatRequest::new("tips?", ContextType::General, Language::En);
        let response = pipeline.handle(&user_id, &request).await.unwrap();
        assert_eq!(response.assistant_message, "Drink water.");
        assert_eq!(response.conversation_id, None);
        assert_eq!(response.remaining_free_messages, 4);
        assert_eq!(
            database::usage::messages_used(db.pool(), &user_id).await.unwrap(),
            1
        );
    }
}
