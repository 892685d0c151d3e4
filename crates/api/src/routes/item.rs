use axum::{Json, extract::{Path, State}};
use serde::{Deserialize, Serialize};
use shoply_db::models::Item;
use tracing::warn;

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use super::{notify_list, parse_object_id};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub barcode: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetBoughtRequest {
    pub bought: bool,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub list_id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub quantity: i64,
    pub is_bought: bool,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub bought_at: Option<i64>,
    pub bought_by: Option<String>,
}

fn to_response(item: Item) -> ItemResponse {
    ItemResponse {
        id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
        list_id: item.list_id.to_hex(),
        name: item.name,
        barcode: item.barcode,
        quantity: item.quantity,
        is_bought: item.is_bought,
        price: item.price,
        description: item.description,
        icon: item.icon,
        created_by: item.created_by.to_hex(),
        created_at: item.created_at.timestamp_millis(),
        updated_at: item.updated_at.timestamp_millis(),
        bought_at: item.bought_at.map(|d| d.timestamp_millis()),
        bought_by: item.bought_by.map(|id| id.to_hex()),
    }
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    state.lists.find_for_member(lid, auth.user_id).await?;

    let items = state.items.find_by_list(lid).await?;
    Ok(Json(items.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<String>,
    Json(body): Json<CreateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    state.members.require_edit(lid, auth.user_id).await?;

    let item = state
        .items
        .create(
            lid,
            body.name,
            body.barcode,
            body.quantity,
            body.price,
            body.description,
            body.icon,
            auth.user_id,
        )
        .await?;

    // Feed the per-user suggestion catalog. Losing a catalog write must
    // never fail the item itself.
    if let Err(e) = state
        .catalog
        .record_use(
            auth.user_id,
            &item.name,
            item.barcode.as_deref(),
            item.icon.as_deref(),
        )
        .await
    {
        warn!(%e, "Failed to record catalog use");
    }

    notify_list(&state, lid, "list:changed").await;
    Ok(Json(to_response(item)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, item_id)): Path<(String, String)>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let iid = parse_object_id(&item_id, "item_id")?;
    state.members.require_edit(lid, auth.user_id).await?;

    let updated = state
        .items
        .update(lid, iid, body.name, body.barcode, body.price, body.description, body.icon)
        .await?;
    if updated {
        notify_list(&state, lid, "list:changed").await;
    }

    let item = state.items.base.find_by_id(iid).await?;
    Ok(Json(to_response(item)))
}

/// Relative quantity adjustment, floored at 1. Applied server-side so
/// concurrent taps from two members both count.
pub async fn adjust_quantity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, item_id)): Path<(String, String)>,
    Json(body): Json<AdjustQuantityRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let iid = parse_object_id(&item_id, "item_id")?;
    state.members.require_edit(lid, auth.user_id).await?;

    let item = state.items.adjust_quantity(lid, iid, body.delta).await?;
    notify_list(&state, lid, "list:changed").await;

    Ok(Json(to_response(item)))
}

pub async fn set_bought(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, item_id)): Path<(String, String)>,
    Json(body): Json<SetBoughtRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let iid = parse_object_id(&item_id, "item_id")?;
    state.members.require_edit(lid, auth.user_id).await?;

    state.items.set_bought(lid, iid, auth.user_id, body.bought).await?;
    notify_list(&state, lid, "list:changed").await;

    let item = state.items.base.find_by_id(iid).await?;
    Ok(Json(to_response(item)))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((list_id, item_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lid = parse_object_id(&list_id, "list_id")?;
    let iid = parse_object_id(&item_id, "item_id")?;
    state.members.require_edit(lid, auth.user_id).await?;

    let deleted = state.items.delete(lid, iid).await?;
    if !deleted {
        return Err(ApiError::NotFound("Item not found".to_string()));
    }
    notify_list(&state, lid, "list:changed").await;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
