//! OpenAI API request and response types.

use coach_core::{RunStatus, ThreadMessage};
use serde::{Deserialize, Serialize};

/// Response to `POST /v1/threads`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadObject {
    /// Thread ID
    pub id: String,
}

/// Body of `POST /v1/threads/{thread_id}/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Body of `POST /v1/threads/{thread_id}/runs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest<'a> {
    pub assistant_id: &'a str,
}

/// A run object, returned by run creation and run retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct RunObject {
    /// Run ID
    pub id: String,
    /// Lifecycle state
    pub status: RunStatus,
    /// Provider-reported failure details
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// Failure details on a run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Response to `GET /v1/threads/{thread_id}/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub data: Vec<MessageObject>,
}

/// A message in a thread.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageObject {
    /// Message ID
    pub id: String,
    /// "user" or "assistant"
    pub role: String,
    /// Content parts
    pub content: Vec<MessageContent>,
}

impl MessageObject {
    /// Concatenate the text parts. Non-text parts (images, files) are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Whether the message carries any text part.
    pub fn has_text(&self) -> bool {
        self.content
            .iter()
            .any(|part| matches!(part, MessageContent::Text { .. }))
    }
}

impl From<MessageObject> for ThreadMessage {
    fn from(message: MessageObject) -> Self {
        let text = message.text();
        ThreadMessage {
            role: message.role,
            text,
        }
    }
}

/// A content part of a thread message.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

/// Text content part.
#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// A chat message for chat completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model to use
    pub model: String,
    /// Messages in the conversation
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response choices
    pub choices: Vec<Choice>,
    /// Token usage
    pub usage: Option<Usage>,
}

/// A response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The message
    pub message: ResponseMessage,
}

/// Response message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Content (may be null on refusals)
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Completion tokens
    pub completion_tokens: u32,
    /// Total tokens
    pub total_tokens: u32,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Error details
    pub error: ApiErrorDetails,
}

/// API error details.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetails {
    /// Error message
    pub message: String,
    /// Error type
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Error code
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_list_extracts_text() {
        let body = r#"{
            "object": "list",
            "data": [{
                "id": "msg_1",
                "object": "thread.message",
                "role": "assistant",
                "content": [
                    {"type": "text", "text": {"value": "Try a consistent ", "annotations": []}},
                    {"type": "image_file", "image_file": {"file_id": "file_1"}},
                    {"type": "text", "text": {"value": "bedtime.", "annotations": []}}
                ]
            }],
            "has_more": false
        }"#;

        let list: MessageList = serde_json::from_str(body).unwrap();
        let message = list.data.into_iter().next().unwrap();
        assert!(message.has_text());

        let thread_message = ThreadMessage::from(message);
        assert!(thread_message.is_assistant());
        assert_eq!(thread_message.text, "Try a consistent bedtime.");
    }

    #[test]
    fn test_run_object_parses_status_and_error() {
        let body = r#"{
            "id": "run_1",
            "object": "thread.run",
            "status": "failed",
            "last_error": {"code": "rate_limit_exceeded", "message": "slow down"}
        }"#;

        let run: RunObject = serde_json::from_str(body).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(
            run.last_error.and_then(|e| e.code).as_deref(),
            Some("rate_limit_exceeded")
        );
    }

    #[test]
    fn test_run_object_rejects_missing_status() {
        let body = r#"{"id": "run_1"}"#;
        assert!(serde_json::from_str::<RunObject>(body).is_err());
    }

    #[test]
    fn test_api_error_body() {
        let body = r#"{"error": {"message": "No thread found with id 'thread_x'.", "type": "invalid_request_error", "code": null}}"#;
        let error: ApiError = serde_json::from_str(body).unwrap();
        assert!(error.error.message.contains("thread_x"));
        assert_eq!(error.error.error_type.as_deref(), Some("invalid_request_error"));
    }
}
