//! JSON bodies exchanged between the chat client and the API server.

use serde::{Deserialize, Serialize};

use crate::types::{ContextType, Language, Plan};

/// Error kind returned with `402` when the free quota is used up.
pub const AI_LIMIT_REACHED: &str = "AI_LIMIT_REACHED";

/// Error kind returned with `410` when the provider thread is gone.
pub const THREAD_EXPIRED: &str = "THREAD_EXPIRED";

/// Body of a chat exchange request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub context_type: ContextType,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_area_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
}

impl ChatRequest {
    /// A request with no life-area or goal linkage.
    pub fn new(message: impl Into<String>, context_type: ContextType, language: Language) -> Self {
        Self {
            message: message.into(),
            context_type,
            language,
            life_area_id: None,
            goal_id: None,
        }
    }
}

/// Body of a successful chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub assistant_message: String,
    /// Absent when the exchange could not be persisted.
    pub conversation_id: Option<String>,
    pub plan: Plan,
    /// Remaining messages this period; `-1` when unlimited.
    pub remaining_free_messages: i64,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_free_messages: Option<i64>,
}

impl ErrorBody {
    /// An error with only a kind/description.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            plan: None,
            remaining_free_messages: None,
        }
    }

    /// Attach a user-facing message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Body of a quota query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub plan: Plan,
    pub used: i64,
    /// `None` when the plan is unlimited.
    pub limit: Option<i64>,
    /// Remaining messages this period; `-1` when unlimited.
    pub remaining_free_messages: i64,
}

/// Body of a goal suggestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSuggestionRequest {
    pub life_area_id: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

/// A single SMART goal proposed by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timeframe: String,
}

/// Life area echoed back with suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeAreaSummary {
    pub id: String,
    pub name: String,
    pub baseline_score: i64,
}

/// Body of a goal suggestion response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSuggestionResponse {
    pub suggestions: Vec<GoalSuggestion>,
    pub life_area: LifeAreaSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_uses_camel_case() {
        let body = r#"{"message":"hi","contextType":"goal_setting","language":"he","lifeAreaId":"area-1"}"#;
        let request: ChatRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.context_type, ContextType::GoalSetting);
        assert_eq!(request.language, Language::He);
        assert_eq!(request.life_area_id.as_deref(), Some("area-1"));
        assert!(request.goal_id.is_none());
    }

    #[test]
    fn test_chat_request_rejects_unknown_context() {
        let body = r#"{"message":"hi","contextType":"gossip","language":"en"}"#;
        assert!(serde_json::from_str::<ChatRequest>(body).is_err());
    }

    #[test]
    fn test_quota_error_body_shape() {
        let body = ErrorBody {
            error: AI_LIMIT_REACHED.to_string(),
            message: Some("Upgrade".to_string()),
            plan: Some(Plan::Free),
            remaining_free_messages: Some(0),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "AI_LIMIT_REACHED");
        assert_eq!(json["plan"], "free");
        assert_eq!(json["remainingFreeMessages"], 0);

        let plain = serde_json::to_value(ErrorBody::new("boom")).unwrap();
        assert_eq!(plain, serde_json::json!({"error": "boom"}));
    }
}
