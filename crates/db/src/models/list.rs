use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A shared shopping list. `member_ids` mirrors the `members` collection
/// and must be updated in the same transaction as any member document.
/// `updated_at` doubles as the recency signal ("touch"): every child
/// item/member/invite mutation refreshes it so clients can sort by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub created_by: ObjectId,
    #[serde(default)]
    pub member_ids: Vec<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

impl List {
    pub const COLLECTION: &'static str = "lists";
}
