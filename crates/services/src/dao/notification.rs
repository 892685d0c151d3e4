use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shoply_db::models::{Invite, Notification, NotificationKind};

use super::base::{BaseDao, DaoResult};

pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    /// Records an in-app notification for a freshly issued invite. Keyed by
    /// email because the invitee may not have an account yet.
    pub async fn invite_received(
        &self,
        invite: &Invite,
        inviter_name: &str,
    ) -> DaoResult<ObjectId> {
        let now = DateTime::now();
        let notification = Notification {
            id: None,
            user_id: None,
            email_lower: invite.email_lower.clone(),
            kind: NotificationKind::InviteReceived,
            list_id: invite.list_id,
            invite_id: invite.id,
            body: format!("{} invited you to \"{}\"", inviter_name, invite.list_title),
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        self.base.insert_one(&notification).await
    }

    pub async fn invite_accepted(
        &self,
        invite: &Invite,
        inviter_id: ObjectId,
        accepter_name: &str,
    ) -> DaoResult<ObjectId> {
        let now = DateTime::now();
        let notification = Notification {
            id: None,
            user_id: Some(inviter_id),
            email_lower: String::new(),
            kind: NotificationKind::InviteAccepted,
            list_id: invite.list_id,
            invite_id: invite.id,
            body: format!("{} joined \"{}\"", accepter_name, invite.list_title),
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        self.base.insert_one(&notification).await
    }

    /// The user's feed: records addressed to their id or their email.
    pub async fn find_for_user(
        &self,
        user_id: ObjectId,
        email: &str,
    ) -> DaoResult<Vec<Notification>> {
        self.base
            .find_many(
                doc! {
                    "$or": [
                        { "user_id": user_id },
                        { "email_lower": email.to_lowercase() },
                    ]
                },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn mark_read(
        &self,
        notification_id: ObjectId,
        user_id: ObjectId,
        email: &str,
    ) -> DaoResult<bool> {
        self.base
            .update_one(
                doc! {
                    "_id": notification_id,
                    "$or": [
                        { "user_id": user_id },
                        { "email_lower": email.to_lowercase() },
                    ]
                },
                doc! { "$set": { "is_read": true } },
            )
            .await
    }
}
