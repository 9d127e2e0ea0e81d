//! In-memory chat session backed by the coach API.

use std::sync::{Mutex, MutexGuard};

use coach_core::wire::{
    ChatRequest, ChatResponse, ErrorBody, GoalSuggestionRequest, GoalSuggestionResponse,
    UsageResponse, AI_LIMIT_REACHED, THREAD_EXPIRED,
};
use coach_core::{Plan, UNLIMITED_MESSAGES};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Who wrote a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of the visible transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Default)]
struct SessionState {
    next_id: u64,
    /// Transcript entries tagged with a local id so a failed send can remove
    /// exactly its own optimistic entry.
    messages: Vec<(u64, ChatMessage)>,
    in_flight: usize,
    last_error: Option<String>,
    remaining: Option<i64>,
    plan: Option<Plan>,
}

impl SessionState {
    fn push(&mut self, role: Role, content: String) -> u64 {
        self.next_id += 1;
        self.messages.push((self.next_id, ChatMessage { role, content }));
        self.next_id
    }

    fn remove(&mut self, id: u64) {
        self.messages.retain(|(entry, _)| *entry != id);
    }
}

/// A user's chat session.
///
/// Holds the transcript for the lifetime of the value only; nothing is
/// written locally. Methods take `&self`, so a UI can read state while a send
/// is in flight.
#[derive(Debug)]
pub struct ChatSession {
    http: Client,
    config: ClientConfig,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Record the user's plan when it is known from their profile.
    pub fn set_plan(&self, plan: Plan) {
        self.lock().plan = Some(plan);
    }

    /// Transcript in display order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock()
            .messages
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Whether a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Last known remaining message count; `-1` means unlimited.
    pub fn remaining_messages(&self) -> Option<i64> {
        self.lock().remaining
    }

    pub fn plan(&self) -> Option<Plan> {
        self.lock().plan
    }

    /// Forget the transcript and any error.
    pub fn clear_messages(&self) {
        let mut state = self.lock();
        state.messages.clear();
        state.last_error = None;
    }

    /// Send one message and wait for the assistant's reply.
    ///
    /// The user's message is shown at once. If the exchange fails for any
    /// reason it is taken back out, since the server never processed it.
    pub async fn send_message(&self, request: ChatRequest) -> Result<ChatResponse, ClientError> {
        let Some(token) = self.config.access_token.clone() else {
            self.lock().last_error = Some(ClientError::NotAuthenticated.to_string());
            return Err(ClientError::NotAuthenticated);
        };

        let pending = {
            let mut state = self.lock();
            state.in_flight += 1;
            state.last_error = None;
            state.push(Role::User, request.message.clone())
        };

        let result = self.post_chat(&token, &request).await;

        let mut state = self.lock();
        state.in_flight -= 1;
        match &result {
            Ok(response) => {
                state.push(Role::Assistant, response.assistant_message.clone());
                state.remaining = Some(response.remaining_free_messages);
                state.plan = Some(response.plan);
            }
            Err(err) => {
                state.remove(pending);
                if let ClientError::LimitReached { plan, .. } = err {
                    state.remaining = Some(0);
                    if plan.is_some() {
                        state.plan = *plan;
                    }
                }
                state.last_error = Some(err.to_string());
                warn!(error = %err, "Chat message failed");
            }
        }

        result
    }

    /// Refresh the remaining message count.
    ///
    /// Premium users are unlimited; no request is made for them.
    pub async fn fetch_remaining_messages(&self) -> Result<i64, ClientError> {
        if self.plan().is_some_and(|plan| plan.is_premium()) {
            self.lock().remaining = Some(UNLIMITED_MESSAGES);
            return Ok(UNLIMITED_MESSAGES);
        }

        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)?;

        let request = self.http.get(self.config.url("/v1/ai/usage")).bearer_auth(token);
        let usage: UsageResponse = send_json(request).await?;

        let mut state = self.lock();
        state.remaining = Some(usage.remaining_free_messages);
        state.plan = Some(usage.plan);
        debug!(remaining = usage.remaining_free_messages, "Fetched remaining messages");
        Ok(usage.remaining_free_messages)
    }

    /// Ask for SMART goal suggestions in a life area.
    pub async fn generate_goal_suggestions(
        &self,
        request: &GoalSuggestionRequest,
    ) -> Result<GoalSuggestionResponse, ClientError> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(ClientError::NotAuthenticated)?;

        let request = self
            .http
            .post(self.config.url("/v1/ai/goal-suggestions"))
            .bearer_auth(token)
            .json(request);
        send_json(request).await
    }

    async fn post_chat(&self, token: &str, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let request = self
            .http
            .post(self.config.url("/v1/ai/chat"))
            .bearer_auth(token)
            .json(request);
        send_json(request).await
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_from_response(response).await)
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();

    if status == StatusCode::UNAUTHORIZED {
        return ClientError::NotAuthenticated;
    }

    match body {
        Some(body) if body.error == AI_LIMIT_REACHED => ClientError::LimitReached {
            message: body.message.unwrap_or_default(),
            plan: body.plan,
        },
        Some(body) if body.error == THREAD_EXPIRED => ClientError::ThreadExpired {
            message: body.message.unwrap_or(body.error),
        },
        Some(body) => ClientError::Server {
            status: status.as_u16(),
            error: body.error,
        },
        None => ClientError::Server {
            status: status.as_u16(),
            error: if text.is_empty() {
                "Failed to send message".to_string()
            } else {
                text
            },
        },
    }
}
