//! Scripted provider - replays canned run statuses and replies.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use coach_core::{
    async_trait, AssistantProvider, CompletionProvider, CompletionRequest, ProviderError,
    RunHandle, RunStatus, ThreadMessage,
};

/// Number of calls made to each provider operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub create_thread: usize,
    pub add_message: usize,
    pub create_run: usize,
    pub get_run: usize,
    pub latest_message: usize,
    pub complete: usize,
}

impl CallCounts {
    /// Total calls across all operations.
    pub fn total(&self) -> usize {
        self.create_thread
            + self.add_message
            + self.create_run
            + self.get_run
            + self.latest_message
            + self.complete
    }
}

#[derive(Debug, Default)]
struct State {
    next_thread: usize,
    next_run: usize,
    /// Live threads and their messages as (role, text).
    threads: HashMap<String, Vec<(String, String)>>,
    /// Runs awaiting completion: run id -> (thread id, remaining statuses).
    runs: HashMap<String, (String, VecDeque<RunStatus>)>,
    calls: CallCounts,
}

/// An in-memory provider driven by a script.
///
/// Each started run replays the configured status script, one status per
/// `get_run` call; the last status repeats once the script is exhausted.
/// When a run is observed as `completed` the configured reply is appended
/// to its thread as an assistant message.
#[derive(Debug)]
pub struct ScriptedProvider {
    reply: String,
    statuses: Vec<RunStatus>,
    completion: Option<String>,
    fail_with: Mutex<Option<ProviderError>>,
    state: Mutex<State>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            reply: "OK".to_string(),
            statuses: vec![RunStatus::Completed],
            completion: None,
            fail_with: Mutex::new(None),
            state: Mutex::new(State::default()),
        }
    }
}

impl ScriptedProvider {
    /// Create a provider whose runs complete on the first poll with "OK".
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the assistant reply produced by completed runs.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Set the status script replayed by every run.
    pub fn with_run_statuses(mut self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        if self.statuses.is_empty() {
            self.statuses.push(RunStatus::Completed);
        }
        self
    }

    /// Set the text returned by chat completions.
    pub fn with_completion(mut self, text: impl Into<String>) -> Self {
        self.completion = Some(text.into());
        self
    }

    /// Make the next provider call fail with `error`.
    pub fn fail_next(&self, error: ProviderError) {
        *lock(&self.fail_with) = Some(error);
    }

    /// Register a thread as existing on the provider (e.g. created earlier).
    pub fn seed_thread(&self, thread_id: impl Into<String>) {
        lock(&self.state).threads.insert(thread_id.into(), Vec::new());
    }

    /// Drop a thread, as if the provider had expired it.
    pub fn expire_thread(&self, thread_id: &str) {
        lock(&self.state).threads.remove(thread_id);
    }

    /// Whether the thread currently exists.
    pub fn has_thread(&self, thread_id: &str) -> bool {
        lock(&self.state).threads.contains_key(thread_id)
    }

    /// Messages appended to a thread, as (role, text).
    pub fn thread_messages(&self, thread_id: &str) -> Vec<(String, String)> {
        lock(&self.state)
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot of the call counters.
    pub fn calls(&self) -> CallCounts {
        lock(&self.state).calls
    }

    fn take_failure(&self) -> Result<(), ProviderError> {
        match lock(&self.fail_with).take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn thread_not_found(thread_id: &str) -> ProviderError {
    ProviderError::NotFound(format!("No thread found with id '{}'.", thread_id))
}

#[async_trait]
impl AssistantProvider for ScriptedProvider {
    async fn create_thread(&self) -> Result<String, ProviderError> {
        lock(&self.state).calls.create_thread += 1;
        self.take_failure()?;

        let mut state = lock(&self.state);
        state.next_thread += 1;
        let id = format!("thread_{}", state.next_thread);
        state.threads.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), ProviderError> {
        lock(&self.state).calls.add_message += 1;
        self.take_failure()?;

        let mut state = lock(&self.state);
        let messages = state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| thread_not_found(thread_id))?;
        messages.push(("user".to_string(), content.to_string()));
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &str,
        _assistant_id: &str,
    ) -> Result<RunHandle, ProviderError> {
        lock(&self.state).calls.create_run += 1;
        self.take_failure()?;

        let mut state = lock(&self.state);
        if !state.threads.contains_key(thread_id) {
            return Err(thread_not_found(thread_id));
        }
        state.next_run += 1;
        let id = format!("run_{}", state.next_run);
        state.runs.insert(
            id.clone(),
            (thread_id.to_string(), self.statuses.iter().copied().collect()),
        );
        Ok(RunHandle {
            id,
            status: RunStatus::Queued,
        })
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ProviderError> {
        lock(&self.state).calls.get_run += 1;
        self.take_failure()?;

        let mut state = lock(&self.state);
        let (run_thread, script) = state
            .runs
            .get_mut(run_id)
            .ok_or_else(|| ProviderError::NotFound(format!("No run found with id '{}'.", run_id)))?;
        if run_thread.as_str() != thread_id {
            return Err(ProviderError::NotFound(format!(
                "No run found with id '{}'.",
                run_id
            )));
        }

        let status = if script.len() > 1 {
            script.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            script.front().copied().unwrap_or(RunStatus::Completed)
        };

        if status == RunStatus::Completed {
            state.runs.remove(run_id);
            if let Some(messages) = state.threads.get_mut(thread_id) {
                messages.push(("assistant".to_string(), self.reply.clone()));
            }
        }

        Ok(status)
    }

    async fn latest_message(
        &self,
        thread_id: &str,
    ) -> Result<Option<ThreadMessage>, ProviderError> {
        lock(&self.state).calls.latest_message += 1;
        self.take_failure()?;

        let state = lock(&self.state);
        let messages = state
            .threads
            .get(thread_id)
            .ok_or_else(|| thread_not_found(thread_id))?;
        Ok(messages.last().map(|(role, text)| ThreadMessage {
            role: role.clone(),
            text: text.clone(),
        }))
    }

    fn name(&self) -> &str {
        "ScriptedProvider"
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
        lock(&self.state).calls.complete += 1;
        self.take_failure()?;

        Ok(self
            .completion
            .clone()
            .unwrap_or_else(|| self.reply.clone()))
    }
}
