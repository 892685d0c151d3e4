use axum::{Json, extract::{Path, State}};
use bson::doc;
use serde::{Deserialize, Serialize};
use shoply_db::models::{Invite, InviteStatus, MemberRole};
use tracing::warn;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use shoply_services::invite_link;

use super::{notify_list, parse_object_id};

#[derive(Debug, Deserialize)]
pub struct IssueInviteRequest {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

fn default_role() -> MemberRole {
    MemberRole::Editor
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub token: Option<String>,
    /// Full deep link as pasted by the user; the token is extracted from
    /// its query or path.
    pub link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub id: String,
    pub list_id: String,
    pub list_title: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub token: String,
    pub link: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

fn to_response(invite: Invite, link_base_url: &str) -> InviteResponse {
    let link = invite_link::build_link(link_base_url, &invite.token);
    InviteResponse {
        id: invite.id.map(|id| id.to_hex()).unwrap_or_default(),
        list_id: invite.list_id.to_hex(),
        list_title: invite.list_title,
        email: invite.email,
        role: invite.role.as_str().to_string(),
        status: status_str(invite.status).to_string(),
        token: invite.token,
        link,
        created_at: invite.created_at.timestamp_millis(),
        expires_at: invite.expires_at.map(|d| d.timestamp_millis()),
    }
}

fn status_str(status: InviteStatus) -> &'static str {
    match status {
        InviteStatus::Pending => "pending",
        InviteStatus::Accepted => "accepted",
        InviteStatus::Revoked => "revoked",
        InviteStatus::Expired => "expired",
    }
}

pub async fn issue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<IssueInviteRequest>,
) -> Result<Json<InviteResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;

    let invite = state
        .invites
        .issue(
            lid,
            auth.user_id,
            &body.email,
            body.role,
            state.settings.invite.ttl_secs,
        )
        .await?;

    // In-app notification for the invitee, keyed by email so it is
    // waiting even if they sign up later.
    let inviter = state.users.base.find_by_id(auth.user_id).await?;
    if let Err(e) = state
        .notifications
        .invite_received(&invite, &inviter.display_name)
        .await
    {
        warn!(%e, "Failed to write invite notification");
    }

    // If the invitee already has an account and a live connection, nudge
    // their inbox immediately.
    if let Ok(invitee) = state.users.find_by_email(&invite.email_lower).await {
        if let Some(invitee_id) = invitee.id {
            let event = serde_json::json!({
                "type": "invite:new",
                "data": {
                    "list_id": invite.list_id.to_hex(),
                    "list_title": invite.list_title.clone(),
                },
            });
            crate::ws::dispatcher::send_to_user(&state.ws_storage, &invitee_id, &event).await;
        }
    }

    Ok(Json(to_response(invite, &state.settings.invite.link_base_url)))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<InviteResponse>>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;

    let invites = state.invites.find_by_list(lid, auth.user_id).await?;
    let base = &state.settings.invite.link_base_url;
    Ok(Json(
        invites.into_iter().map(|i| to_response(i, base)).collect(),
    ))
}

pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, invite_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let iid = parse_object_id(&invite_id, "invite_id")?;

    state.invites.revoke(lid, iid, auth.user_id).await?;
    Ok(Json(serde_json::json!({ "revoked": true })))
}

/// Redeems an invite token and joins the list. Accepts either a bare
/// token or a full deep link. The response reports a title collision
/// with the caller's existing lists, if any, so the client can offer
/// merge-or-rename.
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AcceptInviteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = match (body.token, body.link.as_deref()) {
        (Some(token), _) if !token.trim().is_empty() => token.trim().to_string(),
        (_, Some(link)) => invite_link::extract_token(link).ok_or_else(|| {
            ApiError::BadRequest("No invite token found in link".to_string())
        })?,
        _ => {
            return Err(ApiError::BadRequest(
                "Either token or link is required".to_string(),
            ));
        }
    };

    let (list_id, role) = state.invites.accept(&token, auth.user_id).await?;

    // Tell the inviter and the other members. Both are best-effort.
    if let Ok(Some(invite)) = state.invites.inbox.find_one(doc! { "token": &token }).await {
        let accepter = state.users.base.find_by_id(auth.user_id).await?;
        if let Err(e) = state
            .notifications
            .invite_accepted(&invite, invite.created_by, &accepter.display_name)
            .await
        {
            warn!(%e, "Failed to write acceptance notification");
        }

        let event = serde_json::json!({
            "type": "invite:accepted",
            "data": {
                "list_id": list_id.to_hex(),
                "user_id": auth.user_id.to_hex(),
            },
        });
        crate::ws::dispatcher::send_to_user(&state.ws_storage, &invite.created_by, &event)
            .await;
    }
    notify_list(&state, list_id, "list:changed").await;

    let collision = state
        .lists
        .find_title_collision(auth.user_id, list_id)
        .await?;

    Ok(Json(serde_json::json!({
        "list_id": list_id.to_hex(),
        "role": role.as_str(),
        "collision": collision.map(super::list::to_response),
    })))
}

/// Pending invites addressed to the caller's email.
pub async fn inbox(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<InviteResponse>>, ApiError> {
    let invites = state.invites.pending_for_email(&auth.email).await?;
    let base = &state.settings.invite.link_base_url;
    Ok(Json(
        invites.into_iter().map(|i| to_response(i, base)).collect(),
    ))
}
