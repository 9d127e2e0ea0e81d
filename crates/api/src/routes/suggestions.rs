//! Goal suggestion endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use coach_core::wire::{GoalSuggestionRequest, GoalSuggestionResponse};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// `POST /v1/ai/goal-suggestions`
pub async fn goal_suggestions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: std::result::Result<Json<GoalSuggestionRequest>, JsonRejection>,
) -> Result<Json<GoalSuggestionResponse>> {
    let Json(request) = payload?;
    info!(user_id = %user_id, life_area_id = %request.life_area_id, "Goal suggestion request");

    Ok(Json(state.suggester.suggest(&user_id, &request).await?))
}
