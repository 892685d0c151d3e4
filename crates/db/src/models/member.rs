use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Exactly one document per (list, user). Kept in sync with the parent
/// list's `member_ids` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub list_id: ObjectId,
    pub user_id: ObjectId,
    pub role: MemberRole,
    pub added_at: DateTime,
    pub added_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Owner is assigned only at list creation and can never be granted
/// through the invite flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Editor,
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Editor => "editor",
            MemberRole::Viewer => "viewer",
        }
    }

    /// Roles allowed to mutate list content and issue invites.
    pub fn can_edit(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Editor)
    }
}

impl Member {
    pub const COLLECTION: &'static str = "members";
}
