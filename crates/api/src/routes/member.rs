use std::collections::HashMap;

use axum::{Json, extract::{Path, State}};
use bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};
use shoply_db::models::MemberRole;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::{notify_list, parse_object_id};

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: MemberRole,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub role: String,
    pub display_name: String,
    pub email: String,
    pub added_at: i64,
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    state.lists.find_for_member(lid, auth.user_id).await?;

    let members = state.members.list_members(lid).await?;

    let user_ids: Vec<ObjectId> = members.iter().map(|m| m.user_id).collect();
    let users = state
        .users
        .base
        .find_many(doc! { "_id": { "$in": user_ids } }, None)
        .await?;
    let by_id: HashMap<ObjectId, _> = users
        .into_iter()
        .filter_map(|u| u.id.map(|id| (id, u)))
        .collect();

    let response = members
        .into_iter()
        .map(|m| {
            let user = by_id.get(&m.user_id);
            MemberResponse {
                user_id: m.user_id.to_hex(),
                role: m.role.as_str().to_string(),
                display_name: user.map(|u| u.display_name.clone()).unwrap_or_default(),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                added_at: m.added_at.timestamp_millis(),
            }
        })
        .collect();

    Ok(Json(response))
}

pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, user_id)): Path<(String, String)>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let uid = parse_object_id(&user_id, "user_id")?;

    let changed = state
        .members
        .change_role(lid, auth.user_id, uid, body.role)
        .await?;
    if changed {
        notify_list(&state, lid, "list:changed").await;
    }

    Ok(Json(serde_json::json!({ "changed": changed })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, user_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let uid = parse_object_id(&user_id, "user_id")?;

    let removed = state.members.remove(lid, auth.user_id, uid).await?;
    if removed {
        notify_list(&state, lid, "list:changed").await;
        // The removed member no longer appears in member_ids; tell them
        // directly so their client drops the list.
        let event = serde_json::json!({
            "type": "list:removed",
            "data": { "list_id": lid.to_hex() },
        });
        crate::ws::dispatcher::send_to_user(&state.ws_storage, &uid, &event).await;
    }

    Ok(Json(serde_json::json!({ "removed": removed })))
}
