use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub list_id: ObjectId,
    pub name: String,
    /// Lowercase-trimmed `name`; dedup key component when no barcode is set.
    pub normalized_name: String,
    pub barcode: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub is_bought: bool,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_by: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub bought_at: Option<DateTime>,
    pub bought_by: Option<ObjectId>,
}

fn default_quantity() -> i64 {
    1
}

impl Item {
    pub const COLLECTION: &'static str = "items";

    /// Key used to detect duplicates when merging lists: the barcode wins
    /// over the name, so renamed copies of the same product still collide.
    pub fn dedup_key(&self) -> String {
        match &self.barcode {
            Some(barcode) if !barcode.is_empty() => format!("barcode:{}", barcode),
            _ => format!("name:{}", self.normalized_name),
        }
    }
}

/// Lowercase-trimmed form of an item name.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
