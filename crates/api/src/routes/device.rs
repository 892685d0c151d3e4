use axum::{Json, extract::{Path, State}};
use serde::Deserialize;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub token: String,
    pub platform: String,
}

/// Registers (or refreshes) a device push token for the caller.
pub async fn register(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<RegisterDeviceRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = body.token.trim();
    if token.is_empty() {
        return Err(ApiError::BadRequest("Device token is empty".to_string()));
    }

    state
        .push_tokens
        .register(auth.user_id, token, &body.platform)
        .await?;
    Ok(Json(serde_json::json!({ "registered": true })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.push_tokens.remove(auth.user_id, &token).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
