use std::collections::HashSet;

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shoply_db::models::{Invite, Item, List, Member, MemberRole};
use tracing::{debug, info};

use super::base::{finish_transaction, start_transaction, BaseDao, DaoError, DaoResult};

/// Outcome of merging one list into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub moved: u64,
    pub skipped: u64,
}

pub struct ListDao {
    pub base: BaseDao<List>,
    pub items: BaseDao<Item>,
    pub members: BaseDao<Member>,
    pub invites: BaseDao<Invite>,
    pub inbox: BaseDao<Invite>,
    db: Database,
}

impl ListDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, List::COLLECTION),
            items: BaseDao::new(db, Item::COLLECTION),
            members: BaseDao::new(db, Member::COLLECTION),
            invites: BaseDao::new(db, Invite::COLLECTION),
            inbox: BaseDao::new(db, Invite::INBOX_COLLECTION),
            db: db.clone(),
        }
    }

    /// Creates a list with the creator as its owner. The list document and
    /// the owner member record are written in one transaction so
    /// `member_ids` and the members collection never diverge.
    pub async fn create(&self, title: String, creator_id: ObjectId) -> DaoResult<List> {
        let now = DateTime::now();
        let list_id = ObjectId::new();
        let list = List {
            id: Some(list_id),
            title,
            created_by: creator_id,
            member_ids: vec![creator_id],
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        let member = Member {
            id: None,
            list_id,
            user_id: creator_id,
            role: MemberRole::Owner,
            added_at: now,
            added_by: creator_id,
            created_at: now,
            updated_at: now,
        };

        let mut session = start_transaction(&self.db).await?;
        let result = async {
            self.base.insert_one_with_session(&list, &mut session).await?;
            self.members
                .insert_one_with_session(&member, &mut session)
                .await?;
            Ok(())
        }
        .await;
        finish_transaction(session, result).await?;

        self.base.find_by_id(list_id).await
    }

    /// Lists the user belongs to, most recently touched first.
    pub async fn find_user_lists(&self, user_id: ObjectId) -> DaoResult<Vec<List>> {
        self.base
            .find_many(
                doc! { "member_ids": user_id, "deleted_at": null },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    pub async fn find_for_member(
        &self,
        list_id: ObjectId,
        user_id: ObjectId,
    ) -> DaoResult<List> {
        self.base
            .find_one(doc! { "_id": list_id, "member_ids": user_id, "deleted_at": null })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn rename(&self, list_id: ObjectId, title: String) -> DaoResult<bool> {
        self.base
            .update_by_id(list_id, doc! { "$set": { "title": title } })
            .await
    }

    /// Refreshes `updated_at` so clients sorting by recency see the change.
    pub async fn touch(&self, list_id: ObjectId) -> DaoResult<bool> {
        self.base.update_by_id(list_id, doc! {}).await
    }

    /// Deletes a list and everything under it. Sub-collections go first and
    /// the list document last: a failure partway leaves the list intact
    /// rather than orphaning half-deleted children. Each step is
    /// idempotent, so the whole operation is retry-safe.
    pub async fn delete_cascade(&self, list_id: ObjectId) -> DaoResult<()> {
        self.items.hard_delete(doc! { "list_id": list_id }).await?;
        self.members.hard_delete(doc! { "list_id": list_id }).await?;
        self.invites.hard_delete(doc! { "list_id": list_id }).await?;
        self.inbox.hard_delete(doc! { "list_id": list_id }).await?;
        self.base.hard_delete(doc! { "_id": list_id }).await?;
        info!(?list_id, "List deleted with cascade");
        Ok(())
    }

    /// After joining a list, finds another of the user's lists whose title
    /// matches case-insensitively (excluding the new list itself). The
    /// resolution — merge or rename — is the user's call, never automatic.
    pub async fn find_title_collision(
        &self,
        user_id: ObjectId,
        new_list_id: ObjectId,
    ) -> DaoResult<Option<List>> {
        let new_list = self.base.find_by_id(new_list_id).await?;
        let title_lower = new_list.title.trim().to_lowercase();

        let lists = self.find_user_lists(user_id).await?;
        Ok(lists.into_iter().find(|l| {
            l.id != Some(new_list_id) && l.title.trim().to_lowercase() == title_lower
        }))
    }

    /// Moves every item from `source_id` into `target_id`, skipping items
    /// whose dedup key already exists in the target, then deletes the
    /// source list. One-directional and destructive: the source and its
    /// history are gone afterwards. The caller must hold edit rights on
    /// both lists.
    ///
    /// The item copies and the cascade are not a single transaction; each
    /// step is idempotent and a failure stops at the first error with the
    /// source list still present.
    pub async fn merge_into(
        &self,
        source_id: ObjectId,
        target_id: ObjectId,
    ) -> DaoResult<MergeSummary> {
        if source_id == target_id {
            return Err(DaoError::InvalidArgument(
                "Cannot merge a list into itself".to_string(),
            ));
        }

        let target_items = self
            .items
            .find_many(doc! { "list_id": target_id }, None)
            .await?;
        let mut seen: HashSet<String> = target_items.iter().map(Item::dedup_key).collect();

        let source_items = self
            .items
            .find_many(doc! { "list_id": source_id }, Some(doc! { "created_at": 1 }))
            .await?;

        let mut summary = MergeSummary { moved: 0, skipped: 0 };
        let now = DateTime::now();

        for item in source_items {
            let key = item.dedup_key();
            if !seen.insert(key) {
                summary.skipped += 1;
                continue;
            }

            let moved = Item {
                id: None,
                list_id: target_id,
                created_at: now,
                updated_at: now,
                ..item
            };
            self.items.insert_one(&moved).await?;
            summary.moved += 1;
        }

        self.delete_cascade(source_id).await?;
        self.touch(target_id).await?;

        debug!(
            ?source_id,
            ?target_id,
            moved = summary.moved,
            skipped = summary.skipped,
            "Lists merged"
        );
        Ok(summary)
    }

    /// Keep-separate resolution for a title collision: disambiguate the
    /// newly joined list by appending a suffix (typically the inviter's
    /// display name or email).
    pub async fn rename_with_suffix(
        &self,
        list_id: ObjectId,
        suffix: &str,
    ) -> DaoResult<String> {
        let list = self.base.find_by_id(list_id).await?;
        let suffix = if suffix.trim().is_empty() { "shared" } else { suffix.trim() };
        let title = format!("{} ({})", list.title, suffix);
        self.rename(list_id, title.clone()).await?;
        Ok(title)
    }
}
