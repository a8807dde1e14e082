//! Loading and writing JSON dumps of document collections.
//!
//! A dump is a single JSON object mapping collection names to arrays of
//! documents: `{"scheduled_calls": [{...}], "repo_importers": [...]}`.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::Document;
use crate::domain::ports::DocumentStore;

pub type Dump = BTreeMap<String, Vec<Document>>;

/// Parse a dump from JSON text.
pub fn parse_dump(text: &str) -> StoreResult<Dump> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(collections) = value else {
        return Err(StoreError::Serialization(
            "dump must be an object of collection name to documents".to_string(),
        ));
    };

    let mut dump = Dump::new();
    for (name, docs) in collections {
        let Value::Array(docs) = docs else {
            return Err(StoreError::InvalidDocument {
                collection: name,
                reason: "expected an array of documents".to_string(),
            });
        };
        let parsed = docs
            .into_iter()
            .map(|doc| {
                Document::try_from(doc).map_err(|reason| StoreError::InvalidDocument {
                    collection: name.clone(),
                    reason,
                })
            })
            .collect::<StoreResult<Vec<_>>>()?;
        dump.insert(name, parsed);
    }
    Ok(dump)
}

/// Read a dump file.
pub async fn read_dump(path: &Path) -> StoreResult<Dump> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
    parse_dump(&text)
}

/// Save every document of a dump into the store. Returns documents written.
pub async fn import_dump(store: &dyn DocumentStore, dump: &Dump) -> StoreResult<usize> {
    let mut written = 0;
    for (name, docs) in dump {
        let collection = store.collection(name);
        for doc in docs {
            collection.save(doc).await?;
            written += 1;
        }
        tracing::info!(collection = %name, documents = docs.len(), "imported collection");
    }
    Ok(written)
}

/// Collect the named collections into a dump.
pub async fn export_dump(store: &dyn DocumentStore, names: &[&str]) -> StoreResult<Dump> {
    let mut dump = Dump::new();
    for name in names {
        dump.insert((*name).to_string(), store.collection(name).find(None).await?);
    }
    Ok(dump)
}
