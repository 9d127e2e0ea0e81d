//! Assistant run orchestration: submit, start a run, poll, fetch the reply.

use std::sync::Arc;
use std::time::Duration;

use coach_core::{AssistantProvider, Language, ProviderError};
use tracing::{debug, error, info, warn};

use crate::error::{ChatError, Result};
use crate::localized::language_tag;
use crate::threads::{ThreadRef, ThreadRegistry};

/// Default pause before each run status check.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Default number of status checks before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// How long to wait on a provider run.
///
/// The bound is on status checks, not wall-clock time: a run is abandoned
/// after `max_attempts` checks spaced `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Nominal time spent waiting before a run is declared timed out.
    pub fn deadline(&self) -> Duration {
        self.interval
            .checked_mul(self.max_attempts)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_ATTEMPTS)
    }
}

/// Prefix a message with the language tag the assistant keys its reply
/// language on.
pub fn tag_message(language: Language, message: &str) -> String {
    format!("{} {}", language_tag(language), message)
}

/// Presents the provider's job-based API as a single ask-and-answer call.
///
/// Holds no state of its own beyond its collaborators.
#[derive(Clone)]
pub struct RunOrchestrator {
    provider: Arc<dyn AssistantProvider>,
    registry: ThreadRegistry,
    poll: PollPolicy,
}

impl RunOrchestrator {
    pub fn new(
        provider: Arc<dyn AssistantProvider>,
        registry: ThreadRegistry,
        poll: PollPolicy,
    ) -> Self {
        Self {
            provider,
            registry,
            poll,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    /// Run one exchange on `thread` and return the assistant's reply text.
    ///
    /// A thread the provider no longer knows is removed from the registry
    /// and reported as [`ChatError::ThreadExpired`]; no retry happens here.
    pub async fn run_exchange(
        &self,
        thread: &ThreadRef,
        message: &str,
        language: Language,
    ) -> Result<String> {
        let content = tag_message(language, message);

        match self.provider.add_message(&thread.thread_id, &content).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                warn!(
                    user_id = %thread.user_id,
                    thread_id = %thread.thread_id,
                    error = %err,
                    "Provider no longer knows thread"
                );
                if let Err(err) = self
                    .registry
                    .invalidate(&thread.user_id, &thread.assistant_id)
                    .await
                {
                    error!(
                        user_id = %thread.user_id,
                        thread_id = %thread.thread_id,
                        error = %err,
                        "Failed to drop expired thread mapping"
                    );
                }
                return Err(ChatError::ThreadExpired);
            }
            Err(err) => return Err(err.into()),
        }

        let run = self
            .provider
            .create_run(&thread.thread_id, &thread.assistant_id)
            .await?;
        info!(thread_id = %thread.thread_id, run_id = %run.id, "Started assistant run");

        self.wait_for_run(&thread.thread_id, &run.id).await?;

        let reply = self
            .provider
            .latest_message(&thread.thread_id)
            .await?
            .filter(|message| message.is_assistant() && !message.text.is_empty())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(format!(
                    "thread {} has no assistant reply after run {}",
                    thread.thread_id, run.id
                ))
            })?;

        Ok(reply.text)
    }

    async fn wait_for_run(&self, thread_id: &str, run_id: &str) -> Result<()> {
        for attempt in 1..=self.poll.max_attempts {
            tokio::time::sleep(self.poll.interval).await;

            let status = self.provider.get_run(thread_id, run_id).await?;
            debug!(run_id, attempt, %status, "Polled run status");

            if status.is_success() {
                info!(run_id, attempt, "Assistant run completed");
                return Ok(());
            }
            if status.is_failure() {
                warn!(run_id, %status, "Assistant run ended without a reply");
                return Err(ChatError::RunFailed(status));
            }
        }

        warn!(
            run_id,
            attempts = self.poll.max_attempts,
            "Assistant run did not finish in time"
        );
        Err(ChatError::Timeout {
            attempts: self.poll.max_attempts,
        })
    }
}

impl std::fmt::Debug for RunOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOrchestrator")
            .field("provider", &self.provider.name())
            .field("poll", &self.poll)
            .finish()
    }
}
