use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// In-app notification record. Written when an invite is issued, keyed by
/// the invitee's lowercased email because the recipient may not have an
/// account yet; `user_id` is filled in once known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: Option<ObjectId>,
    pub email_lower: String,
    pub kind: NotificationKind,
    pub list_id: ObjectId,
    pub invite_id: Option<ObjectId>,
    pub body: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    InviteReceived,
    InviteAccepted,
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}
