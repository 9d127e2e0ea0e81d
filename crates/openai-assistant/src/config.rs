//! Configuration for the OpenAI client.

use coach_core::ProviderError;
use std::env;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.openai.com";

/// Default model for one-shot completions.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Configuration for [`OpenAiClient`](crate::OpenAiClient).
#[derive(Clone)]
pub struct AssistantConfig {
    /// API base URL.
    pub api_url: String,

    /// Service-level API key. Never the end user's token.
    pub api_key: String,

    /// Assistant (persona) that runs are started against.
    pub assistant_id: String,

    /// Model used for chat completions.
    pub completion_model: String,

    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[redacted]")
            .field("assistant_id", &self.assistant_id)
            .field("completion_model", &self.completion_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            assistant_id: String::new(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AssistantConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `OPENAI_API_KEY` - API key for authentication
    /// - `OPENAI_ASSISTANT_ID` - Assistant to run threads against
    ///
    /// Optional environment variables:
    /// - `OPENAI_API_URL` - API URL (default: https://api.openai.com)
    /// - `OPENAI_COMPLETION_MODEL` - Completion model (default: gpt-4o-mini)
    /// - `OPENAI_TIMEOUT_SECS` - Per-request timeout (default: 30)
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = required("OPENAI_API_KEY")?;
        let assistant_id = required("OPENAI_ASSISTANT_ID")?;

        let api_url = env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let completion_model = env::var("OPENAI_COMPLETION_MODEL")
            .unwrap_or_else(|_| DEFAULT_COMPLETION_MODEL.to_string());

        let request_timeout = env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            api_url,
            api_key,
            assistant_id,
            completion_model,
            request_timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }
}

fn required(name: &str) -> Result<String, ProviderError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ProviderError::Configuration(format!("{} not set", name)))
}

/// Builder for AssistantConfig.
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the assistant id.
    pub fn assistant_id(mut self, id: impl Into<String>) -> Self {
        self.config.assistant_id = id.into();
        self
    }

    /// Set the completion model.
    pub fn completion_model(mut self, model: impl Into<String>) -> Self {
        self.config.completion_model = model.into();
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AssistantConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AssistantConfig::default();

        assert_eq!(config.api_url, "https://api.openai.com");
        assert!(config.api_key.is_empty());
        assert_eq!(config.completion_model, "gpt-4o-mini");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_all_options() {
        let config = AssistantConfig::builder()
            .api_key("sk-test")
            .api_url("http://localhost:9000")
            .assistant_id("asst_123")
            .completion_model("gpt-4o")
            .request_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.assistant_id, "asst_123");
        assert_eq!(config.completion_model, "gpt-4o");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AssistantConfig::builder().api_key("sk-secret").build();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[redacted]"));
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_openai_vars() {
            std::env::remove_var("OPENAI_API_KEY");
            std::env::remove_var("OPENAI_ASSISTANT_ID");
            std::env::remove_var("OPENAI_API_URL");
            std::env::remove_var("OPENAI_COMPLETION_MODEL");
            std::env::remove_var("OPENAI_TIMEOUT_SECS");
        }

        // Missing API key
        clear_all_openai_vars();
        std::env::set_var("OPENAI_ASSISTANT_ID", "asst_1");
        match AssistantConfig::from_env() {
            Err(ProviderError::Configuration(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Missing assistant id
        clear_all_openai_vars();
        std::env::set_var("OPENAI_API_KEY", "sk-env");
        match AssistantConfig::from_env() {
            Err(ProviderError::Configuration(msg)) => {
                assert!(msg.contains("OPENAI_ASSISTANT_ID"))
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Required vars only, defaults used
        clear_all_openai_vars();
        std::env::set_var("OPENAI_API_KEY", "sk-env");
        std::env::set_var("OPENAI_ASSISTANT_ID", "asst_env");
        let config = AssistantConfig::from_env().unwrap();
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.assistant_id, "asst_env");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.completion_model, DEFAULT_COMPLETION_MODEL);

        // Overrides
        std::env::set_var("OPENAI_API_URL", "http://127.0.0.1:4010");
        std::env::set_var("OPENAI_COMPLETION_MODEL", "gpt-4o");
        std::env::set_var("OPENAI_TIMEOUT_SECS", "12");
        let config = AssistantConfig::from_env().unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:4010");
        assert_eq!(config.completion_model, "gpt-4o");
        assert_eq!(config.request_timeout, Duration::from_secs(12));

        clear_all_openai_vars();
    }
}
