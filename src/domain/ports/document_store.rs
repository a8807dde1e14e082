//! Repository port for schemaless document collections.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::StoreResult;
use crate::domain::models::{Document, FieldUpdate};

/// Access to one named collection.
///
/// Every operation is atomic per document; bulk operations are not atomic
/// across documents.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Name of the collection.
    fn name(&self) -> &str;

    /// Scan every document in natural (insertion) order.
    ///
    /// With a projection only the listed fields plus `_id` are returned.
    async fn find(&self, projection: Option<&[&str]>) -> StoreResult<Vec<Document>>;

    /// Fetch one document by `_id`.
    async fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Replace the document with the same `_id`, inserting it if absent.
    async fn save(&self, document: &Document) -> StoreResult<()>;

    /// Apply a partial update to the document with `id`.
    ///
    /// Returns `false` when no document matched; that is not an error.
    async fn update_one(&self, id: &str, update: &FieldUpdate) -> StoreResult<bool>;

    /// Apply a partial update to every document. Returns the number matched.
    async fn update_all(&self, update: &FieldUpdate) -> StoreResult<u64>;

    /// Number of documents in the collection.
    async fn count(&self) -> StoreResult<u64>;
}

/// A database holding named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Handle to a collection; collections come into existence on first write.
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;

    /// Names of collections that currently hold documents.
    async fn collection_names(&self) -> StoreResult<Vec<String>>;
}
