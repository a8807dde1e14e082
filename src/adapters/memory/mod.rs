//! In-memory document store used by dry runs and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{Document, FieldUpdate};
use crate::domain::ports::{DocumentCollection, DocumentStore};

/// Documents of one collection in insertion order.
#[derive(Debug, Default)]
struct CollectionData {
    order: Vec<String>,
    documents: BTreeMap<String, Document>,
}

type SharedCollections = Arc<RwLock<BTreeMap<String, CollectionData>>>;

/// A document store held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    collections: SharedCollections,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the named collections out of another store.
    pub async fn snapshot_of(source: &dyn DocumentStore, names: &[&str]) -> StoreResult<Self> {
        let snapshot = Self::new();
        for name in names {
            let target = snapshot.collection(name);
            for doc in source.collection(name).find(None).await? {
                target.save(&doc).await?;
            }
        }
        Ok(snapshot)
    }

    /// Insert many documents at once; convenient for fixtures.
    pub async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<()> {
        let handle = self.collection(collection);
        for doc in &documents {
            handle.save(doc).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(InMemoryCollection {
            name: name.to_string(),
            collections: Arc::clone(&self.collections),
        })
    }

    async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections
            .iter()
            .filter(|(_, data)| !data.order.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }
}

/// Handle to one collection of an [`InMemoryDocumentStore`].
pub struct InMemoryCollection {
    name: String,
    collections: SharedCollections,
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, projection: Option<&[&str]>) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(data) = collections.get(&self.name) else {
            return Ok(Vec::new());
        };
        Ok(data
            .order
            .iter()
            .filter_map(|id| data.documents.get(id))
            .map(|doc| projection.map_or_else(|| doc.clone(), |fields| doc.project(fields)))
            .collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&self.name)
            .and_then(|data| data.documents.get(id))
            .cloned())
    }

    async fn save(&self, document: &Document) -> StoreResult<()> {
        let id = document.id().ok_or_else(|| StoreError::InvalidDocument {
            collection: self.name.clone(),
            reason: "document has no textual _id".to_string(),
        })?;
        let mut collections = self.collections.write().await;
        let data = collections.entry(self.name.clone()).or_default();
        if data.documents.insert(id.to_string(), document.clone()).is_none() {
            data.order.push(id.to_string());
        }
        Ok(())
    }

    async fn update_one(&self, id: &str, update: &FieldUpdate) -> StoreResult<bool> {
        let mut collections = self.collections.write().await;
        match collections
            .get_mut(&self.name)
            .and_then(|data| data.documents.get_mut(id))
        {
            Some(doc) => {
                doc.apply(update);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_all(&self, update: &FieldUpdate) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(data) = collections.get_mut(&self.name) else {
            return Ok(0);
        };
        for doc in data.documents.values_mut() {
            doc.apply(update);
        }
        Ok(data.documents.len() as u64)
    }

    async fn count(&self) -> StoreResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&self.name)
            .map_or(0, |data| data.documents.len() as u64))
    }
}
