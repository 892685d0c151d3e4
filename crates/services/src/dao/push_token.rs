use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shoply_db::models::PushToken;
use tracing::info;

use super::base::{BaseDao, DaoResult};

/// Device token registry. Registration is an upsert keyed by the token
/// string, so a device re-registering after reinstall just refreshes its
/// record (and moves it to the current user).
pub struct PushTokenDao {
    pub base: BaseDao<PushToken>,
}

impl PushTokenDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, PushToken::COLLECTION),
        }
    }

    pub async fn register(
        &self,
        user_id: ObjectId,
        token: &str,
        platform: &str,
    ) -> DaoResult<()> {
        let now = DateTime::now();
        self.base
            .collection()
            .update_one(
                doc! { "token": token },
                doc! {
                    "$set": {
                        "user_id": user_id,
                        "platform": platform,
                        "last_seen_at": now,
                        "updated_at": now,
                    },
                    "$setOnInsert": { "created_at": now },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, user_id: ObjectId, token: &str) -> DaoResult<bool> {
        let deleted = self
            .base
            .hard_delete(doc! { "user_id": user_id, "token": token })
            .await?;
        Ok(deleted > 0)
    }

    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<PushToken>> {
        self.base
            .find_many(doc! { "user_id": user_id }, Some(doc! { "last_seen_at": -1 }))
            .await
    }

    /// Drops tokens the delivery layer reported dead. Idempotent.
    pub async fn prune(&self, tokens: &[String]) -> DaoResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let deleted = self
            .base
            .hard_delete(doc! { "token": { "$in": tokens } })
            .await?;
        if deleted > 0 {
            info!(deleted, "Pruned dead push tokens");
        }
        Ok(deleted)
    }
}
