use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use rand::RngCore;
use shoply_db::models::{Invite, InviteStatus, List, MemberRole};
use tracing::{debug, info};
use validator::ValidateEmail;

use super::base::{finish_transaction, start_transaction, BaseDao, DaoError, DaoResult};
use super::member::MemberDao;

/// Invites may grant editor or viewer; owner exists only from list creation.
pub fn validate_role(role: MemberRole) -> DaoResult<MemberRole> {
    match role {
        MemberRole::Owner => Err(DaoError::InvalidArgument(
            "Owner role cannot be granted via invite".to_string(),
        )),
        role => Ok(role),
    }
}

/// 128-bit random token, hex-encoded. Doubles as the inbox document key
/// and the shareable link parameter.
pub fn new_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub struct InviteDao {
    pub base: BaseDao<Invite>,
    pub inbox: BaseDao<Invite>,
    lists: BaseDao<List>,
    members: MemberDao,
    db: Database,
}

impl InviteDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Invite::COLLECTION),
            inbox: BaseDao::new(db, Invite::INBOX_COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
            members: MemberDao::new(db),
            db: db.clone(),
        }
    }

    /// Issues an invite: writes the list-scoped copy and the inbox copy in
    /// one transaction, so listeners never observe one without the other.
    /// Each call produces an independent invite with its own token, even
    /// for a (list, email) pair that already has one pending.
    pub async fn issue(
        &self,
        list_id: ObjectId,
        inviter_id: ObjectId,
        email: &str,
        role: MemberRole,
        ttl_secs: u64,
    ) -> DaoResult<Invite> {
        let role = validate_role(role)?;
        if !email.validate_email() {
            return Err(DaoError::InvalidArgument(format!(
                "Not a valid email address: {}",
                email
            )));
        }
        self.members.require_edit(list_id, inviter_id).await?;

        let list = self.lists.find_by_id(list_id).await?;

        let now = DateTime::now();
        let expires_at = (ttl_secs > 0)
            .then(|| DateTime::from_millis(now.timestamp_millis() + ttl_secs as i64 * 1000));

        let invite = Invite {
            // Preset so both copies share the same id.
            id: Some(ObjectId::new()),
            list_id,
            list_title: list.title,
            email: email.to_string(),
            email_lower: email.to_lowercase(),
            allowed_emails: vec![email.to_string(), email.to_lowercase()],
            role,
            status: InviteStatus::Pending,
            token: new_token(),
            created_by: inviter_id,
            created_at: now,
            updated_at: now,
            expires_at,
            accepted_at: None,
            accepted_by: None,
        };

        let mut session = start_transaction(&self.db).await?;
        let result = async {
            self.base.insert_one_with_session(&invite, &mut session).await?;
            self.inbox.insert_one_with_session(&invite, &mut session).await?;
            self.lists
                .update_one_with_session(doc! { "_id": list_id }, doc! {}, &mut session)
                .await?;
            Ok(())
        }
        .await;
        finish_transaction(session, result).await?;

        info!(?list_id, invite_id = ?invite.id, "Invite issued");
        Ok(invite)
    }

    /// Accepts an invite by token and grants membership.
    ///
    /// State machine: `pending` moves to exactly one of `accepted`,
    /// `revoked`, or `expired`; terminal states never reopen. Expiry is
    /// lazy — an overdue invite transitions on first access, not via a
    /// background sweep.
    ///
    /// Idempotent: re-accepting an already-accepted invite as the same
    /// user returns the same result without rewriting anything. Any other
    /// non-pending invite resolves to `not-found`, so a second, different
    /// user can never take over a consumed token.
    pub async fn accept(
        &self,
        token: &str,
        accepting_user_id: ObjectId,
    ) -> DaoResult<(ObjectId, MemberRole)> {
        let invite = self
            .inbox
            .find_one(doc! { "token": token })
            .await?
            .ok_or(DaoError::NotFound)?;

        match invite.status {
            InviteStatus::Pending => {}
            InviteStatus::Accepted if invite.accepted_by == Some(accepting_user_id) => {
                // Same user retrying a completed acceptance: converge, no-op.
                return Ok((invite.list_id, effective_role(invite.role)));
            }
            _ => return Err(DaoError::NotFound),
        }

        let now = DateTime::now();
        if invite.is_expired_at(now) {
            self.transition_both(token, InviteStatus::Expired, doc! {}).await?;
            return Err(DaoError::FailedPrecondition(format!(
                "Invite {} has expired",
                token
            )));
        }

        // A pending invite pointing at a deleted list is malformed.
        let list = self
            .lists
            .find_one(doc! { "_id": invite.list_id, "deleted_at": null })
            .await?
            .ok_or_else(|| {
                DaoError::Internal(format!(
                    "Invite {} references missing list {}",
                    token,
                    invite.list_id.to_hex()
                ))
            })?;

        let role = effective_role(invite.role);
        self.members
            .grant(invite.list_id, accepting_user_id, role, invite.created_by)
            .await?;

        // Guarded on accepted_by so a retry after the grant succeeded does
        // not rewrite the acceptance timestamps.
        self.transition_both_guarded(
            token,
            accepting_user_id,
            InviteStatus::Accepted,
            doc! { "accepted_at": now, "accepted_by": accepting_user_id },
        )
        .await?;

        debug!(list_id = ?list.id, ?accepting_user_id, "Invite accepted");
        Ok((invite.list_id, role))
    }

    /// Pending invites addressed to this email, for the recipient's inbox
    /// view. Overdue ones are lazily expired and dropped from the result.
    pub async fn pending_for_email(&self, email: &str) -> DaoResult<Vec<Invite>> {
        let candidates = self
            .inbox
            .find_many(
                doc! { "email_lower": email.to_lowercase(), "status": "pending" },
                Some(doc! { "created_at": -1 }),
            )
            .await?;

        let now = DateTime::now();
        let mut pending = Vec::with_capacity(candidates.len());
        for invite in candidates {
            if invite.is_expired_at(now) {
                self.transition_both(&invite.token, InviteStatus::Expired, doc! {})
                    .await?;
            } else {
                pending.push(invite);
            }
        }
        Ok(pending)
    }

    pub async fn find_by_list(
        &self,
        list_id: ObjectId,
        actor_id: ObjectId,
    ) -> DaoResult<Vec<Invite>> {
        self.members.require_edit(list_id, actor_id).await?;
        self.base
            .find_many(doc! { "list_id": list_id }, Some(doc! { "created_at": -1 }))
            .await
    }

    /// Explicit revoke by an owner/editor. Only a pending invite can be
    /// revoked; terminal states stay as they are.
    pub async fn revoke(
        &self,
        list_id: ObjectId,
        invite_id: ObjectId,
        actor_id: ObjectId,
    ) -> DaoResult<()> {
        self.members.require_edit(list_id, actor_id).await?;

        let invite = self
            .base
            .find_one(doc! { "_id": invite_id, "list_id": list_id })
            .await?
            .ok_or(DaoError::NotFound)?;

        if invite.status != InviteStatus::Pending {
            return Err(DaoError::FailedPrecondition(format!(
                "Invite {} is not pending",
                invite_id.to_hex()
            )));
        }

        self.transition_both(&invite.token, InviteStatus::Revoked, doc! {})
            .await?;
        info!(?list_id, ?invite_id, "Invite revoked");
        Ok(())
    }

    /// Applies a status transition to both copies, keyed by token. Filtered
    /// on `status == pending` so terminal states are never overwritten.
    async fn transition_both(
        &self,
        token: &str,
        status: InviteStatus,
        extra_set: bson::Document,
    ) -> DaoResult<()> {
        let mut set = extra_set;
        set.insert("status", status_str(status));
        let filter = doc! { "token": token, "status": "pending" };

        self.base
            .update_one(filter.clone(), doc! { "$set": set.clone() })
            .await?;
        self.inbox.update_one(filter, doc! { "$set": set }).await?;
        Ok(())
    }

    /// Acceptance variant: also skips the write when `accepted_by` already
    /// matches, keeping repeated acceptance timestamp-stable.
    async fn transition_both_guarded(
        &self,
        token: &str,
        user_id: ObjectId,
        status: InviteStatus,
        extra_set: bson::Document,
    ) -> DaoResult<()> {
        let mut set = extra_set;
        set.insert("status", status_str(status));
        let filter = doc! {
            "token": token,
            "status": "pending",
            "accepted_by": { "$ne": user_id },
        };

        self.base
            .update_one(filter.clone(), doc! { "$set": set.clone() })
            .await?;
        self.inbox.update_one(filter, doc! { "$set": set }).await?;
        Ok(())
    }
}

/// The member record written on acceptance never carries owner, whatever
/// the stored invite says.
fn effective_role(role: MemberRole) -> MemberRole {
    match role {
        MemberRole::Owner => MemberRole::Editor,
        role => role,
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
