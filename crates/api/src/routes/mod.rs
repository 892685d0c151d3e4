use bson::{doc, oid::ObjectId};

use crate::state::AppState;

pub mod auth;
pub mod catalog;
pub mod device;
pub mod invite;
pub mod item;
pub mod list;
pub mod member;
pub mod notification;

/// Fans a list-scoped event out to every member's live connections.
/// Best-effort by design: delivery has no bound and failures are logged,
/// not propagated.
pub(crate) async fn notify_list(state: &AppState, list_id: ObjectId, event_type: &str) {
    let Ok(Some(list)) = state.lists.base.find_one(doc! { "_id": list_id }).await else {
        return;
    };

    let event = serde_json::json!({
        "type": event_type,
        "data": { "list_id": list_id.to_hex() },
    });
    crate::ws::dispatcher::broadcast(&state.ws_storage, &list.member_ids, &event).await;
}

pub(crate) fn parse_object_id(value: &str, what: &str) -> Result<ObjectId, crate::error::ApiError> {
    ObjectId::parse_str(value)
        .map_err(|_| crate::error::ApiError::BadRequest(format!("Invalid {}", what)))
}
