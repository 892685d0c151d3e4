use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Registered device token. Delivery itself is out of scope; the registry
/// exists so a delivery layer can look tokens up and prune dead ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub token: String,
    pub platform: String,
    pub last_seen_at: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl PushToken {
    pub const COLLECTION: &'static str = "push_tokens";
}
