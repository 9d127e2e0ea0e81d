//! Route handlers for the coach API.

pub mod chat;
pub mod health;
pub mod suggestions;
pub mod usage;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Coach endpoints (bearer auth)
        .route("/v1/ai/chat", post(chat::chat))
        .route("/v1/ai/usage", get(usage::usage))
        .route("/v1/ai/goal-suggestions", post(suggestions::goal_suggestions))
}
