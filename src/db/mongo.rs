//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{
    options::{IndexOptions, UpdateModifications},
    results::UpdateResult,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::types::AnnuaireError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB duplicate-key error code (unique index violation)
const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == DUPLICATE_KEY_CODE
    )
}

fn map_mongo_err(context: &str, err: mongodb::error::Error) -> AnnuaireError {
    if is_duplicate_key(&err) {
        AnnuaireError::Duplicate(format!("{context}: duplicate key"))
    } else {
        AnnuaireError::Database(format!("{context}: {err}"))
    }
}

/// MongoDB client wrapper.
///
/// Owned by `AppState` and injected into handlers; the driver pools
/// connections internally, so there is no per-request open/close.
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Create a new MongoDB client and verify the connection with a ping
    pub async fn new(uri: &str, db_name: &str, timeout_ms: u64) -> Result<Self, AnnuaireError> {
        info!("Connecting to MongoDB database '{}'", db_name);

        // Fixed per-operation timeouts; avoids hanging on unreachable MongoDB
        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS={timeout_ms}&connectTimeoutMS={timeout_ms}")
        } else {
            format!("{uri}?serverSelectionTimeoutMS={timeout_ms}&connectTimeoutMS={timeout_ms}")
        };

        let client = Client::with_uri_str(&timeout_uri).await.map_err(|e| {
            AnnuaireError::Config(format!("Failed to connect to MongoDB: {e}"))
        })?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| AnnuaireError::Config(format!("MongoDB ping failed: {e}")))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, AnnuaireError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the raw MongoDB client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, AnnuaireError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), AnnuaireError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| AnnuaireError::Database(format!("Failed to create indexes: {e}")))?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps.
    ///
    /// Unique-index violations surface as `AnnuaireError::Duplicate`.
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, AnnuaireError> {
        let metadata = item.mut_metadata();
        metadata.is_deleted = false;
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(|e| map_mongo_err("Insert failed", e))?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| AnnuaireError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter, excluding soft-deleted documents
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, AnnuaireError> {
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        self.inner
            .find_one(full_filter)
            .await
            .map_err(|e| AnnuaireError::Database(format!("Find failed: {e}")))
    }

    /// Find one document by ObjectId
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>, AnnuaireError> {
        self.find_one(doc! { "_id": id }).await
    }

    /// Find many documents by filter, excluding soft-deleted documents
    pub async fn find_many(&self, filter: Document) -> Result<Vec<T>, AnnuaireError> {
        use futures_util::StreamExt;

        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        let cursor = self
            .inner
            .find(full_filter)
            .await
            .map_err(|e| AnnuaireError::Database(format!("Find failed: {e}")))?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Count documents matching the filter, excluding soft-deleted documents
    pub async fn count(&self, filter: Document) -> Result<u64, AnnuaireError> {
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        self.inner
            .count_documents(full_filter)
            .await
            .map_err(|e| AnnuaireError::Database(format!("Count failed: {e}")))
    }

    /// Update one document.
    ///
    /// Unique-index violations surface as `AnnuaireError::Duplicate`.
    pub async fn update_one(
        &self,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> Result<UpdateResult, AnnuaireError> {
        self.inner
            .update_one(filter, update.into())
            .await
            .map_err(|e| map_mongo_err("Update failed", e))
    }

    /// Soft delete a document
    pub async fn soft_delete(&self, filter: Document) -> Result<UpdateResult, AnnuaireError> {
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        let update = doc! {
            "$set": {
                "metadata.is_deleted": true,
                "metadata.deleted_at": DateTime::now(),
                "metadata.updated_at": DateTime::now(),
            }
        };

        self.update_one(full_filter, update).await
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}
