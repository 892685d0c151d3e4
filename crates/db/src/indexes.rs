use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Users
    create_indexes(
        db,
        "users",
        vec![
            index_unique(bson::doc! { "email_lower": 1 }),
            index_unique(bson::doc! { "username": 1 }),
        ],
    )
    .await?;

    // Lists
    create_indexes(
        db,
        "lists",
        vec![
            index(bson::doc! { "member_ids": 1, "updated_at": -1 }),
            index(bson::doc! { "created_by": 1 }),
        ],
    )
    .await?;

    // Items
    create_indexes(
        db,
        "items",
        vec![
            index(bson::doc! { "list_id": 1, "created_at": 1 }),
            index(bson::doc! { "list_id": 1, "normalized_name": 1 }),
            index(bson::doc! { "list_id": 1, "barcode": 1 }),
        ],
    )
    .await?;

    // Members
    create_indexes(
        db,
        "members",
        vec![
            index_unique(bson::doc! { "list_id": 1, "user_id": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    // Invites (list-scoped copies)
    create_indexes(
        db,
        "invites",
        vec![
            index_unique(bson::doc! { "token": 1 }),
            index(bson::doc! { "list_id": 1, "status": 1 }),
        ],
    )
    .await?;

    // Invites inbox (token-keyed mirror)
    create_indexes(
        db,
        "invites_inbox",
        vec![
            index_unique(bson::doc! { "token": 1 }),
            index(bson::doc! { "email_lower": 1, "status": 1 }),
        ],
    )
    .await?;

    // Catalog
    create_indexes(
        db,
        "catalog",
        vec![
            index_unique(bson::doc! { "user_id": 1, "normalized_name": 1 }),
            index(bson::doc! { "user_id": 1, "use_count": -1 }),
        ],
    )
    .await?;

    // Push tokens
    create_indexes(
        db,
        "push_tokens",
        vec![
            index_unique(bson::doc! { "token": 1 }),
            index(bson::doc! { "user_id": 1 }),
        ],
    )
    .await?;

    // Notifications
    create_indexes(
        db,
        "notifications",
        vec![
            index(bson::doc! { "email_lower": 1, "is_read": 1, "created_at": -1 }),
            index(bson::doc! { "user_id": 1, "is_read": 1, "created_at": -1 }),
        ],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    db.collection::<bson::Document>(collection)
        .create_indexes(indexes)
        .await?;
    info!(collection, "Indexes created");
    Ok(())
}
