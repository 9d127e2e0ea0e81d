//! Chat exchange endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use coach_core::wire::{ChatRequest, ChatResponse};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// `POST /v1/ai/chat`
pub async fn chat(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload?;
    info!(
        user_id = %user_id,
        context_type = %request.context_type,
        language = %request.language,
        "Chat request"
    );

    let language = request.language;
    let response = state
        .pipeline
        .handle(&user_id, &request)
        .await
        .map_err(|e| ApiError::from_chat(e, language))?;

    Ok(Json(response))
}
