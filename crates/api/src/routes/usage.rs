//! Remaining-quota endpoint.

use axum::extract::State;
use axum::Json;
use coach_core::wire::UsageResponse;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// `GET /v1/ai/usage`
pub async fn usage(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UsageResponse>> {
    Ok(Json(state.pipeline.usage(&user_id).await?))
}
