//! Document store used for all site content.
//!
//! The rest of the application only sees the [`ContentStore`] trait; the
//! SQLite implementation keeps each document as a JSON object.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::{DataFetchError, StoreError};
use crate::models::{decode_all, Document, Fields, FromDocument, HomeContent, HOME_DOCUMENT_ID};

/// Identity assigned by the store to a newly created document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Async collection/document read-write interface.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All documents of a collection, in insertion order.
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn fetch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// Create a document under a generated id and a server timestamp.
    async fn create_document(&self, collection: &str, fields: Fields)
        -> Result<Created, StoreError>;

    /// Fails with [`StoreError::NotFound`] when the id does not exist.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Replace a document in place, creating it if missing.
    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError>;
}

/// Fetch and decode a whole collection. Malformed documents are dropped.
pub async fn load_collection<T: FromDocument>(
    store: &dyn ContentStore,
) -> Result<Vec<T>, DataFetchError> {
    let docs = store
        .fetch_collection(T::COLLECTION)
        .await
        .map_err(|source| DataFetchError {
            collection: T::COLLECTION.to_string(),
            source,
        })?;
    Ok(decode_all(docs))
}

/// Fetch the home page singleton. A missing or malformed document falls
/// back to the default copy.
pub async fn load_home(store: &dyn ContentStore) -> Result<HomeContent, DataFetchError> {
    let doc = store
        .fetch_document(HomeContent::COLLECTION, HOME_DOCUMENT_ID)
        .await
        .map_err(|source| DataFetchError {
            collection: HomeContent::COLLECTION.to_string(),
            source,
        })?;

    let Some(doc) = doc else {
        return Ok(HomeContent::default());
    };
    Ok(HomeContent::from_document(&doc).unwrap_or_else(|e| {
        tracing::warn!("Malformed home content, serving defaults: {}", e);
        HomeContent::default()
    }))
}

/// SQLite-backed content store.
#[derive(Clone)]
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, fields, created_at FROM documents WHERE collection = ? ORDER BY seq",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in &rows {
            match document_from_row(row) {
                Ok(doc) => docs.push(doc),
                Err(e) => {
                    let id: String = row.get("id");
                    tracing::warn!(collection, id = %id, "Unreadable document row: {}", e);
                }
            }
        }
        Ok(docs)
    }

    async fn fetch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "SELECT id, fields, created_at FROM documents WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<Created, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let fields_json = serde_json::to_string(&fields)?;

        sqlx::query(
            "INSERT INTO documents (collection, id, fields, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&id)
        .bind(&fields_json)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(collection, id = %id, "Document created");
        Ok(Created { id, created_at })
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }

        tracing::debug!(collection, id, "Document deleted");
        Ok(())
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let fields_json = serde_json::to_string(&fields)?;

        sqlx::query(
            r#"INSERT INTO documents (collection, id, fields, created_at) VALUES (?, ?, ?, ?)
               ON CONFLICT (collection, id)
               DO UPDATE SET fields = excluded.fields, created_at = excluded.created_at"#,
        )
        .bind(collection)
        .bind(id)
        .bind(&fields_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(collection, id, "Document upserted");
        Ok(())
    }
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Document, StoreError> {
    let fields_str: String = row.try_get("fields")?;
    Ok(Document {
        id: row.try_get("id")?,
        fields: serde_json::from_str(&fields_str)?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::Event;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store() -> (SqliteContentStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("store.sqlite")).await.unwrap();
        (SqliteContentStore::new(pool), dir)
    }

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_collection_preserves_insertion_order() {
        let (store, _dir) = store().await;
        for name in ["first", "second", "third"] {
            store
                .create_document("gallery", fields(json!({ "url": name })))
                .await
                .unwrap();
        }
        store
            .create_document("events", fields(json!({ "title": "other" })))
            .await
            .unwrap();

        let docs = store.fetch_collection("gallery").await.unwrap();
        let urls: Vec<_> = docs.iter().map(|d| d.fields["url"].clone()).collect();
        assert_eq!(urls, vec![json!("first"), json!("second"), json!("third")]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (store, _dir) = store().await;
        let err = store.delete_document("events", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let (store, _dir) = store().await;
        store
            .upsert_document("home", "content", fields(json!({ "title": "A" })))
            .await
            .unwrap();
        store
            .upsert_document("home", "content", fields(json!({ "title": "B" })))
            .await
            .unwrap();

        let docs = store.fetch_collection("home").await.unwrap();
        assert_eq!(docs.len(), 1);
        let doc = store.fetch_document("home", "content").await.unwrap().unwrap();
        assert_eq!(doc.fields["title"], json!("B"));
    }

    #[tokio::test]
    async fn test_load_collection_drops_malformed_records() {
        let (store, _dir) = store().await;
        store
            .create_document(
                "events",
                fields(json!({
                    "title": "Fair",
                    "description": "Science fair",
                    "eventDate": "2025-05-10"
                })),
            )
            .await
            .unwrap();
        store
            .create_document(
                "events",
                fields(json!({ "title": "Broken", "description": "x", "eventDate": "??" })),
            )
            .await
            .unwrap();

        let events: Vec<Event> = load_collection(&store).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Fair");
    }
}
