use axum::{Json, extract::{Path, State}};
use serde::Serialize;
use shoply_db::models::{Notification, NotificationKind};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::parse_object_id;

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub kind: String,
    pub list_id: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: i64,
}

fn to_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
        kind: match n.kind {
            NotificationKind::InviteReceived => "invite_received".to_string(),
            NotificationKind::InviteAccepted => "invite_accepted".to_string(),
        },
        list_id: n.list_id.to_hex(),
        body: n.body,
        is_read: n.is_read,
        created_at: n.created_at.timestamp_millis(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state
        .notifications
        .find_for_user(auth.user_id, &auth.email)
        .await?;
    Ok(Json(notifications.into_iter().map(to_response).collect()))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let nid = parse_object_id(&notification_id, "notification_id")?;

    let marked = state
        .notifications
        .mark_read(nid, auth.user_id, &auth.email)
        .await?;
    if !marked {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "read": true })))
}
