//! Configuration for the chat client.

use std::env;
use std::time::Duration;

use crate::error::ClientError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8790";

/// Where to reach the coach API and how to authenticate.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Bearer token of the signed-in user, if any.
    pub access_token: Option<String>,
    /// Per-request timeout. Must cover the server's whole poll budget.
    pub timeout: Duration,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Read `COACH_API_URL` and `COACH_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var("COACH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "COACH_API_URL must be an http(s) URL, got {}",
                base_url
            )));
        }

        let mut config = Self::new(base_url);
        config.access_token = env::var("COACH_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());
        Ok(config)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
