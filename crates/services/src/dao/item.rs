use bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use mongodb::Database;
use shoply_db::models::{item::normalize_name, Item, List};
use tracing::debug;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ItemDao {
    pub base: BaseDao<Item>,
    lists: BaseDao<List>,
}

impl ItemDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Item::COLLECTION),
            lists: BaseDao::new(db, List::COLLECTION),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        list_id: ObjectId,
        name: String,
        barcode: Option<String>,
        quantity: i64,
        price: Option<f64>,
        description: Option<String>,
        icon: Option<String>,
        created_by: ObjectId,
    ) -> DaoResult<Item> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DaoError::InvalidArgument("Item name is empty".to_string()));
        }

        let now = DateTime::now();
        let item = Item {
            id: None,
            list_id,
            normalized_name: normalize_name(&name),
            name,
            barcode,
            quantity: quantity.max(1),
            is_bought: false,
            price,
            description,
            icon,
            created_by,
            created_at: now,
            updated_at: now,
            bought_at: None,
            bought_by: None,
        };

        let id = self.base.insert_one(&item).await?;
        self.touch_list(list_id).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_list(&self, list_id: ObjectId) -> DaoResult<Vec<Item>> {
        self.base
            .find_many(doc! { "list_id": list_id }, Some(doc! { "created_at": 1 }))
            .await
    }

    /// Scalar field updates are last-write-wins; renaming recomputes the
    /// normalized dedup component.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        list_id: ObjectId,
        item_id: ObjectId,
        name: Option<String>,
        barcode: Option<String>,
        price: Option<f64>,
        description: Option<String>,
        icon: Option<String>,
    ) -> DaoResult<bool> {
        let mut set_doc = doc! {};

        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DaoError::InvalidArgument("Item name is empty".to_string()));
            }
            set_doc.insert("normalized_name", normalize_name(&name));
            set_doc.insert("name", name);
        }
        if let Some(barcode) = barcode {
            set_doc.insert("barcode", barcode);
        }
        if let Some(price) = price {
            set_doc.insert("price", price);
        }
        if let Some(description) = description {
            set_doc.insert("description", description);
        }
        if let Some(icon) = icon {
            set_doc.insert("icon", icon);
        }

        if set_doc.is_empty() {
            return Ok(false);
        }

        let updated = self
            .base
            .update_one(
                doc! { "_id": item_id, "list_id": list_id },
                doc! { "$set": set_doc },
            )
            .await?;
        if updated {
            self.touch_list(list_id).await?;
        }
        Ok(updated)
    }

    /// Atomic increment/decrement, floored at 1. A single server-side
    /// arithmetic update means two clients adjusting concurrently cannot
    /// lose each other's writes.
    pub async fn adjust_quantity(
        &self,
        list_id: ObjectId,
        item_id: ObjectId,
        delta: i64,
    ) -> DaoResult<Item> {
        let pipeline = vec![doc! {
            "$set": {
                "quantity": { "$max": [1, { "$add": ["$quantity", delta] }] },
                "updated_at": "$$NOW",
            }
        }];

        let item = self
            .base
            .collection()
            .find_one_and_update(doc! { "_id": item_id, "list_id": list_id }, pipeline)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(DaoError::NotFound)?;

        self.touch_list(list_id).await?;
        Ok(item)
    }

    pub async fn set_bought(
        &self,
        list_id: ObjectId,
        item_id: ObjectId,
        user_id: ObjectId,
        bought: bool,
    ) -> DaoResult<bool> {
        let set_doc = if bought {
            doc! {
                "is_bought": true,
                "bought_at": DateTime::now(),
                "bought_by": user_id,
            }
        } else {
            doc! {
                "is_bought": false,
                "bought_at": null,
                "bought_by": null,
            }
        };

        let updated = self
            .base
            .update_one(
                doc! { "_id": item_id, "list_id": list_id },
                doc! { "$set": set_doc },
            )
            .await?;
        if updated {
            self.touch_list(list_id).await?;
        }
        Ok(updated)
    }

    pub async fn delete(&self, list_id: ObjectId, item_id: ObjectId) -> DaoResult<bool> {
        let deleted = self
            .base
            .hard_delete(doc! { "_id": item_id, "list_id": list_id })
            .await?;
        if deleted > 0 {
            self.touch_list(list_id).await?;
            debug!(?list_id, ?item_id, "Item deleted");
        }
        Ok(deleted > 0)
    }

    /// Every item mutation refreshes the parent list's recency signal.
    async fn touch_list(&self, list_id: ObjectId) -> DaoResult<()> {
        self.lists.update_one(doc! { "_id": list_id }, doc! {}).await?;
        Ok(())
    }
}
