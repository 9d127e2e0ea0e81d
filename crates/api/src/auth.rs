//! Bearer token authentication.

use std::collections::HashMap;
use std::time::Duration;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Why a token was not accepted.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingToken,

    #[error("Invalid authorization token")]
    InvalidToken,

    /// The auth service could not be reached or answered unexpectedly.
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves a bearer token to a user id.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<String, AuthError>;
}

#[derive(Debug, Deserialize)]
struct AuthUserBody {
    id: String,
}

/// Verifies tokens against the managed auth service (`GET /auth/v1/user`).
#[derive(Clone)]
pub struct RemoteAuthenticator {
    client: reqwest::Client,
    auth_url: String,
    service_key: String,
}

impl RemoteAuthenticator {
    pub fn new(auth_url: impl Into<String>, service_key: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            auth_url: auth_url.into(),
            service_key: service_key.into(),
        })
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.auth_url))
            .bearer_auth(token)
            .header("apikey", &self.service_key)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            warn!(%status, "Auth service returned an error");
            return Err(AuthError::Unavailable(format!("status {}", status)));
        }

        let body: AuthUserBody = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if body.id.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(body.id)
    }
}

impl std::fmt::Debug for RemoteAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteAuthenticator")
            .field("auth_url", &self.auth_url)
            .field("service_key", &"[redacted]")
            .finish()
    }
}

/// Fixed token table, for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    tokens: HashMap<String, String>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `user_id`.
    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Extract the bearer token from request headers.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// The authenticated caller's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;
        let user_id = state.auth.authenticate(token).await?;
        debug!(user_id = %user_id, "Authenticated request");
        Ok(AuthUser(user_id))
    }
}
