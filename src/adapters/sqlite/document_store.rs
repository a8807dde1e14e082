//! SQLite adapter for DocumentStore.
//!
//! Documents live as JSON text in the `documents` table. Partial updates go
//! through the JSON1 functions (`json_set` / `json_remove`) inside a
//! transaction, so a reader never observes a half-applied update.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{Document, FieldUpdate};
use crate::domain::ports::{DocumentCollection, DocumentStore};

#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(SqliteCollection {
            pool: self.pool.clone(),
            name: name.to_string(),
        })
    }

    async fn collection_names(&self) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT collection FROM documents ORDER BY collection")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

/// Handle to one collection of a [`SqliteDocumentStore`].
pub struct SqliteCollection {
    pool: SqlitePool,
    name: String,
}

impl SqliteCollection {
    fn parse_body(&self, body: &str) -> StoreResult<Document> {
        serde_json::from_str(body).map_err(|e| StoreError::InvalidDocument {
            collection: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Apply `update` to one document (`id = Some`) or the whole collection.
    async fn apply_update(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Option<&str>,
        update: &FieldUpdate,
    ) -> StoreResult<()> {
        let id_clause = if id.is_some() { " AND doc_id = ?" } else { "" };

        for (field, value) in update.sets() {
            let sql = format!(
                "UPDATE documents SET body = json_set(body, ?, json(?)) WHERE collection = ?{id_clause}"
            );
            let mut query = sqlx::query(&sql)
                .bind(json_path(&self.name, field)?)
                .bind(serde_json::to_string(value)?)
                .bind(&self.name);
            if let Some(id) = id {
                query = query.bind(id);
            }
            query.execute(&mut **tx).await?;
        }

        for field in update.unsets() {
            let sql = format!(
                "UPDATE documents SET body = json_remove(body, ?) WHERE collection = ?{id_clause}"
            );
            let mut query = sqlx::query(&sql)
                .bind(json_path(&self.name, field)?)
                .bind(&self.name);
            if let Some(id) = id {
                query = query.bind(id);
            }
            query.execute(&mut **tx).await?;
        }

        Ok(())
    }
}

/// JSON path addressing a top-level field.
fn json_path(collection: &str, field: &str) -> StoreResult<String> {
    if field.is_empty() || field.contains('"') {
        return Err(StoreError::InvalidDocument {
            collection: collection.to_string(),
            reason: format!("unsupported field name '{field}'"),
        });
    }
    Ok(format!("$.\"{field}\""))
}

#[async_trait]
impl DocumentCollection for SqliteCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(&self, projection: Option<&[&str]>) -> StoreResult<Vec<Document>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? ORDER BY seq")
                .bind(&self.name)
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|(body,)| {
                let doc = self.parse_body(body)?;
                Ok(match projection {
                    Some(fields) => doc.project(fields),
                    None => doc,
                })
            })
            .collect()
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = ? AND doc_id = ?")
                .bind(&self.name)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(body,)| self.parse_body(&body)).transpose()
    }

    async fn save(&self, document: &Document) -> StoreResult<()> {
        let id = document.id().ok_or_else(|| StoreError::InvalidDocument {
            collection: self.name.clone(),
            reason: "document has no textual _id".to_string(),
        })?;
        let body = serde_json::to_string(document)?;

        sqlx::query(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, doc_id) DO UPDATE SET body = excluded.body",
        )
        .bind(&self.name)
        .bind(id)
        .bind(&body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_one(&self, id: &str, update: &FieldUpdate) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM documents WHERE collection = ? AND doc_id = ?")
                .bind(&self.name)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        self.apply_update(&mut tx, Some(id), update).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn update_all(&self, update: &FieldUpdate) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;

        let (matched,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(&self.name)
            .fetch_one(&mut *tx)
            .await?;

        self.apply_update(&mut tx, None, update).await?;
        tx.commit().await?;
        Ok(u64::try_from(matched).unwrap_or(0))
    }

    async fn count(&self) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(&self.name)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_path_quotes_field() {
        assert_eq!(json_path("c", "scheduled_syncs").unwrap(), "$.\"scheduled_syncs\"");
        assert!(json_path("c", "").is_err());
        assert!(json_path("c", "bad\"name").is_err());
    }
}
