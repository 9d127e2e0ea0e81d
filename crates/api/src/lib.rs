//! HTTP API for the wellness coach.
//!
//! Exposes the chat pipeline over JSON:
//!
//! | Method | Path | Body | Success |
//! |--------|------|------|---------|
//! | `POST` | `/v1/ai/chat` | `ChatRequest` | `200 ChatResponse` |
//! | `GET` | `/v1/ai/usage` | | `200 UsageResponse` |
//! | `POST` | `/v1/ai/goal-suggestions` | `GoalSuggestionRequest` | `200 GoalSuggestionResponse` |
//! | `GET` | `/health` | | `200 {"status":"ok"}` |
//!
//! Every `/v1` route requires `Authorization: Bearer <token>`; the token is
//! resolved to a user id by an [`Authenticator`] before the handler runs.
//! Failures are JSON `{"error": ...}` bodies; see [`ApiError`] for the status
//! mapping.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use auth::{AuthError, AuthUser, Authenticator, RemoteAuthenticator, StaticAuthenticator};
pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use state::AppState;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

/// Build the application with CORS applied.
pub fn app(state: AppState) -> Router {
    routes::router().layer(cors()).with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ])
}
