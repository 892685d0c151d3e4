use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Per-user memory of previously added items, used for suggestions.
/// One entry per (user, normalized_name); re-adding bumps `use_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub name: String,
    pub normalized_name: String,
    pub barcode: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub use_count: u64,
    pub last_used_at: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl CatalogEntry {
    pub const COLLECTION: &'static str = "catalog";
}
