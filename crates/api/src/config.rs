//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use coach::PollPolicy;
use coach_core::ProviderError;
use openai_assistant::AssistantConfig;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Base URL of the auth service that resolves bearer tokens.
    pub auth_url: String,
    /// Service key sent alongside user tokens to the auth service.
    pub auth_service_key: String,
    /// Provider client settings.
    pub assistant: AssistantConfig,
    /// Run polling cadence.
    pub poll: PollPolicy,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COACH_API_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:coach.db?mode=rwc` |
    /// | `AUTH_URL` | Auth service base URL | (required) |
    /// | `AUTH_SERVICE_KEY` | Auth service key | (required) |
    /// | `COACH_POLL_INTERVAL_MS` | Pause between run status checks | `1500` |
    /// | `COACH_POLL_MAX_ATTEMPTS` | Status checks before timing out | `30` |
    ///
    /// Provider variables are read by [`AssistantConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("COACH_API_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:coach.db?mode=rwc".to_string());

        let auth_url = required("AUTH_URL")?;
        let auth_service_key = required("AUTH_SERVICE_KEY")?;

        let assistant = AssistantConfig::from_env().map_err(ConfigError::Provider)?;

        let defaults = PollPolicy::default();
        let interval = number("COACH_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);
        let max_attempts = match number("COACH_POLL_MAX_ATTEMPTS")? {
            Some(n) => u32::try_from(n).map_err(|_| ConfigError::InvalidNumber("COACH_POLL_MAX_ATTEMPTS"))?,
            None => defaults.max_attempts,
        };

        Ok(Self {
            addr,
            database_url,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            auth_service_key,
            assistant,
            poll: PollPolicy::new(interval, max_attempts),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn number(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid COACH_API_ADDR format")]
    InvalidAddr,

    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{0} must be a non-negative integer")]
    InvalidNumber(&'static str),

    #[error("provider configuration: {0}")]
    Provider(ProviderError),
}
