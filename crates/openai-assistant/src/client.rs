//! OpenAI HTTP client implementing the provider traits.

use async_trait::async_trait;
use coach_core::{
    AssistantProvider, CompletionProvider, CompletionRequest, ProviderError, RunHandle, RunStatus,
    ThreadMessage,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CreateMessageRequest,
    CreateRunRequest, MessageList, RunObject, ThreadObject,
};
use crate::config::AssistantConfig;

/// Header selecting the Assistants API version.
const ASSISTANTS_BETA: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Client for the OpenAI Assistants and chat-completions APIs.
///
/// Each call is a single authenticated HTTPS request using the service-level
/// API key from [`AssistantConfig`]. The client holds no conversation state;
/// threads live on the provider.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    config: AssistantConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AssistantConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "OpenAiClient initialized with assistant: {}, completion model: {}",
            config.assistant_id, config.completion_model
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`AssistantConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(AssistantConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn assistants_get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    fn assistants_post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.config.api_key)
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    /// Send a request and decode a success body into `T`.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(|e| {
            ProviderError::Network(format!("Failed to {}: {}", operation, e))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ApiError>(&error_text) {
                Ok(api_error) => match api_error.error.code {
                    Some(code) => format!("{} ({})", api_error.error.message, code),
                    None => api_error.error.message,
                },
                Err(_) => error_text,
            };

            warn!(status = status.as_u16(), "Failed to {}: {}", operation, message);

            if status == StatusCode::NOT_FOUND {
                return Err(ProviderError::NotFound(message));
            }

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::Network(format!("Failed to read {} response: {}", operation, e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::MalformedResponse(format!("Failed to parse {} response: {}", operation, e))
        })
    }
}

#[async_trait]
impl AssistantProvider for OpenAiClient {
    async fn create_thread(&self) -> Result<String, ProviderError> {
        let request = self
            .assistants_post("threads")
            .json(&serde_json::json!({}));
        let thread: ThreadObject = self.send_json(request, "create thread").await?;

        debug!(thread_id = %thread.id, "Created thread");
        Ok(thread.id)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), ProviderError> {
        let request = self
            .assistants_post(&format!("threads/{}/messages", thread_id))
            .json(&CreateMessageRequest {
                role: "user",
                content,
            });
        let _: serde_json::Value = self.send_json(request, "add message").await?;

        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<RunHandle, ProviderError> {
        let request = self
            .assistants_post(&format!("threads/{}/runs", thread_id))
            .json(&CreateRunRequest { assistant_id });
        let run: RunObject = self.send_json(request, "start run").await?;

        debug!(thread_id, run_id = %run.id, status = %run.status, "Started run");
        Ok(RunHandle {
            id: run.id,
            status: run.status,
        })
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ProviderError> {
        let request = self.assistants_get(&format!("threads/{}/runs/{}", thread_id, run_id));
        let run: RunObject = self.send_json(request, "check run status").await?;

        if let Some(error) = run.last_error.as_ref() {
            warn!(
                run_id,
                code = error.code.as_deref().unwrap_or("unknown"),
                "Run reported error: {}",
                error.message.as_deref().unwrap_or("")
            );
        }

        Ok(run.status)
    }

    async fn latest_message(
        &self,
        thread_id: &str,
    ) -> Result<Option<ThreadMessage>, ProviderError> {
        let request = self
            .assistants_get(&format!("threads/{}/messages", thread_id))
            .query(&[("order", "desc"), ("limit", "1")]);
        let list: MessageList = self.send_json(request, "retrieve messages").await?;

        let Some(message) = list.data.into_iter().next() else {
            return Ok(None);
        };

        if !message.has_text() {
            return Err(ProviderError::MalformedResponse(format!(
                "message {} has no text content",
                message.id
            )));
        }

        Ok(Some(message.into()))
    }

    fn name(&self) -> &str {
        "OpenAiClient"
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: self.config.completion_model.clone(),
            messages: vec![
                ChatMessage::system(request.system),
                ChatMessage::user(request.prompt),
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let http_request = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body);
        let completion: ChatCompletionResponse =
            self.send_json(http_request, "create completion").await?;

        if let Some(usage) = completion.usage.as_ref() {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::MalformedResponse("completion has no content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> OpenAiClient {
        let config = AssistantConfig::builder()
            .api_key("sk-test")
            .api_url(url)
            .assistant_id("asst_1")
            .build();
        OpenAiClient::new(config).unwrap()
    }

    #[test]
    fn test_url_joins_version_prefix() {
        assert_eq!(
            client("https://api.openai.com").url("threads/t1/runs"),
            "https://api.openai.com/v1/threads/t1/runs"
        );
        assert_eq!(
            client("http://localhost:4010/").url("threads"),
            "http://localhost:4010/v1/threads"
        );
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(client("http://localhost").name(), "OpenAiClient");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = client("http://127.0.0.1:9");
        let result = client.create_thread().await;
        assert!(matches!(result, Err(ProviderError::Network(_))));
    }
}
