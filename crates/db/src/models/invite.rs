use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::member::MemberRole;

/// One invite exists as two documents sharing `_id` and `token`: a
/// list-scoped copy in `invites` and a flat copy in `invites_inbox` that
/// recipients can look up by token or email without knowing the list.
/// Status transitions are applied to both copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invite {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub list_id: ObjectId,
    /// Denormalized so the inbox can render without fetching the list.
    pub list_title: String,
    pub email: String,
    pub email_lower: String,
    /// Original-case and lowercased email, so matching tolerates case
    /// differences without a secondary index.
    pub allowed_emails: Vec<String>,
    pub role: MemberRole,
    #[serde(default)]
    pub status: InviteStatus,
    pub token: String,
    pub created_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub expires_at: Option<DateTime>,
    pub accepted_at: Option<DateTime>,
    pub accepted_by: Option<ObjectId>,
}

/// Monotonic: `Pending` moves to exactly one terminal state and never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Revoked,
    Expired,
}

impl Invite {
    pub const COLLECTION: &'static str = "invites";
    pub const INBOX_COLLECTION: &'static str = "invites_inbox";

    pub fn is_expired_at(&self, now: DateTime) -> bool {
        matches!(self.expires_at, Some(exp) if exp < now)
    }
}
