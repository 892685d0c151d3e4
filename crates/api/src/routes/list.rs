use axum::{Json, extract::{Path, State}};
use bson::doc;
use serde::{Deserialize, Serialize};
use shoply_db::models::{List, MemberRole};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::{notify_list, parse_object_id};

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub target_list_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameSuffixRequest {
    pub suffix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub id: String,
    pub title: String,
    pub created_by: String,
    pub member_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) fn to_response(list: List) -> ListResponse {
    ListResponse {
        id: list.id.map(|id| id.to_hex()).unwrap_or_default(),
        title: list.title,
        created_by: list.created_by.to_hex(),
        member_ids: list.member_ids.iter().map(|id| id.to_hex()).collect(),
        created_at: list.created_at.timestamp_millis(),
        updated_at: list.updated_at.timestamp_millis(),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ListResponse>>, ApiError> {
    let lists = state.lists.find_user_lists(auth.user_id).await?;
    Ok(Json(lists.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("List title is empty".to_string()));
    }

    let list = state.lists.create(title, auth.user_id).await?;
    Ok(Json(to_response(list)))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<ListResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let list = state.lists.find_for_member(lid, auth.user_id).await?;
    Ok(Json(to_response(list)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<UpdateListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let title = body.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("List title is empty".to_string()));
    }

    state.members.require_edit(lid, auth.user_id).await?;
    state.lists.rename(lid, title).await?;
    notify_list(&state, lid, "list:changed").await;

    let list = state.lists.base.find_by_id(lid).await?;
    Ok(Json(to_response(list)))
}

/// Deleting a list is owner-only and cascades to items, members and
/// invites. Members are notified before the cascade removes them.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;

    let role = state.members.find_role(lid, auth.user_id).await?;
    if role != Some(MemberRole::Owner) {
        return Err(ApiError::Forbidden(
            "Only the owner can delete a list".to_string(),
        ));
    }

    notify_list(&state, lid, "list:deleted").await;
    state.lists.delete_cascade(lid).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// After joining via invite, reports whether the caller already has a
/// list with the same title. Resolution is the caller's next request,
/// never automatic.
pub async fn collision(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    state.lists.find_for_member(lid, auth.user_id).await?;

    let collision = state.lists.find_title_collision(auth.user_id, lid).await?;
    Ok(Json(serde_json::json!({
        "collision": collision.map(to_response),
    })))
}

/// Merges this list into the target, deduplicating by barcode (or
/// normalized name), then deletes this list. Requires edit rights on
/// both sides.
pub async fn merge(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<MergeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let source_id = parse_object_id(&list_id, "list_id")?;
    let target_id = parse_object_id(&body.target_list_id, "target_list_id")?;

    state.members.require_edit(source_id, auth.user_id).await?;
    state.members.require_edit(target_id, auth.user_id).await?;

    let summary = state.lists.merge_into(source_id, target_id).await?;
    notify_list(&state, target_id, "list:changed").await;

    Ok(Json(serde_json::json!({
        "moved": summary.moved,
        "skipped": summary.skipped,
        "target_list_id": target_id.to_hex(),
    })))
}

/// Keep-separate resolution: renames the list with a disambiguating
/// suffix. Defaults to the inviter's name when none is given.
pub async fn rename_suffix(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<RenameSuffixRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    state.lists.find_for_member(lid, auth.user_id).await?;

    let suffix = match body.suffix {
        Some(s) if !s.trim().is_empty() => s,
        _ => inviter_suffix(&state, lid, &auth).await?,
    };

    let title = state.lists.rename_with_suffix(lid, &suffix).await?;
    notify_list(&state, lid, "list:changed").await;

    Ok(Json(serde_json::json!({ "title": title })))
}

/// Looks up who invited the caller to this list and uses their display
/// name as the suffix. Falls back to a generic suffix when the invite
/// trail is gone.
async fn inviter_suffix(
    state: &AppState,
    list_id: bson::oid::ObjectId,
    auth: &AuthUser,
) -> Result<String, ApiError> {
    let invite = state
        .invites
        .base
        .find_one(doc! { "list_id": list_id, "accepted_by": auth.user_id })
        .await?;

    let Some(invite) = invite else {
        return Ok(String::new());
    };

    match state.users.base.find_by_id(invite.created_by).await {
        Ok(user) if !user.display_name.trim().is_empty() => Ok(user.display_name),
        Ok(user) => Ok(user.email),
        Err(_) => Ok(String::new()),
    }
}
