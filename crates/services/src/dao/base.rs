use bson::{doc, oid::ObjectId, Document};
use mongodb::{ClientSession, Collection, Database};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error taxonomy shared by every DAO. The API layer maps these onto HTTP
/// statuses; messages name the attempted operation so client-visible errors
/// stay diagnosable without server log access.
#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),
    #[error("Internal: {0}")]
    Internal(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> DaoResult<Vec<T>> {
        let mut cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        let mut results = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(map_duplicate_key)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::Internal("inserted_id is not an ObjectId".to_string()))?;
        debug!(?id, "Inserted document");
        Ok(id)
    }

    pub async fn insert_one_with_session(
        &self,
        doc: &T,
        session: &mut ClientSession,
    ) -> DaoResult<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .session(session)
            .await
            .map_err(map_duplicate_key)?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::Internal("inserted_id is not an ObjectId".to_string()))?;
        Ok(id)
    }

    /// Applies `update`, always refreshing `updated_at` inside its `$set`.
    pub async fn update_one(&self, filter: Document, update: Document) -> DaoResult<bool> {
        let update = with_updated_at(update);
        let result = self.collection.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_one_with_session(
        &self,
        filter: Document,
        update: Document,
        session: &mut ClientSession,
    ) -> DaoResult<bool> {
        let update = with_updated_at(update);
        let result = self
            .collection
            .update_one(filter, update)
            .session(session)
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn update_by_id(&self, id: ObjectId, update: Document) -> DaoResult<bool> {
        self.update_one(doc! { "_id": id }, update).await
    }

    pub async fn hard_delete(&self, filter: Document) -> DaoResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn hard_delete_with_session(
        &self,
        filter: Document,
        session: &mut ClientSession,
    ) -> DaoResult<u64> {
        let result = self
            .collection
            .delete_many(filter)
            .session(session)
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}

/// Merges an `updated_at` refresh into the update's `$set` clause.
fn with_updated_at(mut update: Document) -> Document {
    match update.get_document_mut("$set") {
        Ok(set_doc) => {
            set_doc.insert("updated_at", bson::DateTime::now());
        }
        Err(_) => {
            update.insert("$set", doc! { "updated_at": bson::DateTime::now() });
        }
    }
    update
}

fn map_duplicate_key(e: mongodb::error::Error) -> DaoError {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
        ref write_error,
    )) = *e.kind
    {
        if write_error.code == 11000 {
            return DaoError::DuplicateKey(write_error.message.clone());
        }
    }
    DaoError::Mongo(e)
}

/// Starts a session with an open transaction. Callers commit on success and
/// abort on the error path so listeners never observe a partial write.
pub async fn start_transaction(db: &Database) -> DaoResult<ClientSession> {
    let mut session = db.client().start_session().await?;
    session.start_transaction().await?;
    Ok(session)
}

/// Commits on `Ok`, aborts on `Err`. The abort failure is swallowed: the
/// original error is the one worth reporting.
pub async fn finish_transaction<T>(
    mut session: ClientSession,
    result: DaoResult<T>,
) -> DaoResult<T> {
    match result {
        Ok(value) => {
            session.commit_transaction().await?;
            Ok(value)
        }
        Err(e) => {
            let _ = session.abort_transaction().await;
            Err(e)
        }
    }
}
