use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shoply_db::models::{List, Member, MemberRole};
use tracing::debug;

use super::base::{finish_transaction, start_transaction, BaseDao, DaoError, DaoResult};

pub struct MemberDao {
    pub base: BaseDao<Member>,
    lists: BaseDao<List>,
    db: Database,
}

impl MemberDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Member::COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
            db: db.clone(),
        }
    }

    pub async fn find_role(
        &self,
        list_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<Option<MemberRole>> {
        let member = self
            .base
            .find_one(doc! { "list_id": list_id, "user_id": user_id })
            .await?;
        Ok(member.map(|m| m.role))
    }

    /// Resolves the caller's role, failing with `permission-denied` when
    /// they are not a member or cannot edit.
    pub async fn require_edit(
        &self,
        list_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<MemberRole> {
        let role = self
            .find_role(list_id, user_id)
            .await?
            .ok_or_else(|| {
                DaoError::PermissionDenied(format!("Not a member of list {}", list_id.to_hex()))
            })?;
        if !role.can_edit() {
            return Err(DaoError::PermissionDenied(format!(
                "Role {} cannot modify list {}",
                role.as_str(),
                list_id.to_hex()
            )));
        }
        Ok(role)
    }

    pub async fn list_members(&self, list_id: ObjectId) -> DaoResult<Vec<Member>> {
        self.base
            .find_many(doc! { "list_id": list_id }, Some(doc! { "added_at": 1 }))
            .await
    }

    /// Grants membership: upserts the member record and adds the user to
    /// the list's `member_ids` in one transaction. `$addToSet` plus the
    /// upsert filter make re-grants converge to a single member record, so
    /// two concurrent acceptances of the same invite both succeed.
    pub async fn grant(
        &self,
        list_id: ObjectId,
        user_id: ObjectId,
        role: MemberRole,
        added_by: ObjectId,
    ) -> DaoResult<()> {
        let now = DateTime::now();

        let mut session = start_transaction(&self.db).await?;
        let result = async {
            self.base
                .collection()
                .update_one(
                    doc! { "list_id": list_id, "user_id": user_id },
                    doc! {
                        "$setOnInsert": {
                            "list_id": list_id,
                            "user_id": user_id,
                            "role": role.as_str(),
                            "added_at": now,
                            "added_by": added_by,
                            "created_at": now,
                        },
                        "$set": { "updated_at": now },
                    },
                )
                .upsert(true)
                .session(&mut session)
                .await?;

            self.lists
                .update_one_with_session(
                    doc! { "_id": list_id },
                    doc! { "$addToSet": { "member_ids": user_id } },
                    &mut session,
                )
                .await?;
            Ok(())
        }
        .await;
        finish_transaction(session, result).await?;

        debug!(?list_id, ?user_id, role = role.as_str(), "Membership granted");
        Ok(())
    }

    /// Owner-only. Owner itself can never be granted this way.
    pub async fn change_role(
        &self,
        list_id: ObjectId,
        actor_id: ObjectId,
        target_user_id: ObjectId,
        role: MemberRole,
    ) -> DaoResult<bool> {
        if role == MemberRole::Owner {
            return Err(DaoError::InvalidArgument(
                "Owner role cannot be granted".to_string(),
            ));
        }
        let actor_role = self.find_role(list_id, actor_id).await?;
        if actor_role != Some(MemberRole::Owner) {
            return Err(DaoError::PermissionDenied(
                "Only the owner can change member roles".to_string(),
            ));
        }
        if actor_id == target_user_id {
            return Err(DaoError::InvalidArgument(
                "Owner cannot change their own role".to_string(),
            ));
        }

        self.base
            .update_one(
                doc! { "list_id": list_id, "user_id": target_user_id, "role": { "$ne": "owner" } },
                doc! { "$set": { "role": role.as_str() } },
            )
            .await
    }

    /// Removes a member: deletes the member record and pulls the user out
    /// of `member_ids` in the same transaction — there is no window where
    /// one side reflects the removal and the other does not.
    pub async fn remove(
        &self,
        list_id: ObjectId,
        actor_id: ObjectId,
        target_user_id: ObjectId,
    ) -> DaoResult<bool> {
        let actor_role = self.find_role(list_id, actor_id).await?.ok_or_else(|| {
            DaoError::PermissionDenied(format!("Not a member of list {}", list_id.to_hex()))
        })?;

        // Members may remove themselves; removing others takes the owner.
        if actor_id != target_user_id && actor_role != MemberRole::Owner {
            return Err(DaoError::PermissionDenied(
                "Only the owner can remove other members".to_string(),
            ));
        }

        let target_role = self.find_role(list_id, target_user_id).await?;
        if target_role == Some(MemberRole::Owner) {
            return Err(DaoError::FailedPrecondition(
                "The owner cannot be removed; delete the list instead".to_string(),
            ));
        }

        let mut session = start_transaction(&self.db).await?;
        let result = async {
            let deleted = self
                .base
                .hard_delete_with_session(
                    doc! { "list_id": list_id, "user_id": target_user_id },
                    &mut session,
                )
                .await?;

            if deleted > 0 {
                self.lists
                    .update_one_with_session(
                        doc! { "_id": list_id },
                        doc! { "$pull": { "member_ids": target_user_id } },
                        &mut session,
                    )
                    .await?;
            }
            Ok(deleted > 0)
        }
        .await;
        finish_transaction(session, result).await
    }
}
