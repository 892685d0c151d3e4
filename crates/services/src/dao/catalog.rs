use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use shoply_db::models::{item::normalize_name, CatalogEntry};

use super::base::{BaseDao, DaoResult};

/// Per-user item memory backing name suggestions. Fed on every item add.
pub struct CatalogDao {
    pub base: BaseDao<CatalogEntry>,
}

impl CatalogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, CatalogEntry::COLLECTION),
        }
    }

    /// Upserts the entry for this name and bumps its usage counter.
    pub async fn record_use(
        &self,
        user_id: ObjectId,
        name: &str,
        barcode: Option<&str>,
        icon: Option<&str>,
    ) -> DaoResult<()> {
        let normalized = normalize_name(name);
        let now = DateTime::now();

        let mut set = doc! {
            "name": name.trim(),
            "last_used_at": now,
            "updated_at": now,
        };
        if let Some(barcode) = barcode {
            set.insert("barcode", barcode);
        }
        if let Some(icon) = icon {
            set.insert("icon", icon);
        }

        self.base
            .collection()
            .update_one(
                doc! { "user_id": user_id, "normalized_name": normalized },
                doc! {
                    "$set": set,
                    "$inc": { "use_count": 1 },
                    "$setOnInsert": { "created_at": now },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    /// Prefix suggestions, most used first.
    pub async fn suggest(
        &self,
        user_id: ObjectId,
        query: &str,
        limit: i64,
    ) -> DaoResult<Vec<CatalogEntry>> {
        let escaped = escape_regex(&normalize_name(query));

        let mut cursor = self
            .base
            .collection()
            .find(doc! {
                "user_id": user_id,
                "normalized_name": { "$regex": format!("^{}", escaped) },
            })
            .sort(doc! { "use_count": -1, "last_used_at": -1 })
            .limit(limit)
            .await?;

        let mut results = Vec::new();
        use futures::TryStreamExt;
        while let Some(entry) = cursor.try_next().await? {
            results.push(entry);
        }
        Ok(results)
    }
}

/// Escape regex special chars for safe MongoDB $regex usage.
fn escape_regex(query: &str) -> String {
    query
        .chars()
        .flat_map(|c| {
            if ".*+?^${}()|[]\\".contains(c) {
                vec!['\\', c]
            } else {
                vec![c]
            }
        })
        .collect()
}
