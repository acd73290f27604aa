//! In-memory content store for tests, with switchable failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{ContentStore, Created};
use crate::errors::StoreError;
use crate::models::{Document, Fields};

#[derive(Default)]
pub struct MemoryContentStore {
    docs: Mutex<Vec<(String, Document)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of write calls that reached the store, failed or not.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .count()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn fetch_collection(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check_read()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == collection)
            .map(|(_, d)| d.clone())
            .collect())
    }

    async fn fetch_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check_read()?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .iter()
            .find(|(c, d)| c == collection && d.id == id)
            .map(|(_, d)| d.clone()))
    }

    async fn create_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<Created, StoreError> {
        self.check_write()?;
        let created = Created {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };
        self.docs.lock().unwrap().push((
            collection.to_string(),
            Document {
                id: created.id.clone(),
                fields,
                created_at: created.created_at,
            },
        ));
        Ok(created)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        let before = docs.len();
        docs.retain(|(c, d)| !(c == collection && d.id == id));
        if docs.len() == before {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut docs = self.docs.lock().unwrap();
        let doc = Document {
            id: id.to_string(),
            fields,
            created_at: Utc::now(),
        };
        match docs
            .iter_mut()
            .find(|(c, d)| c == collection && d.id == id)
        {
            Some(slot) => slot.1 = doc,
            None => docs.push((collection.to_string(), doc)),
        }
        Ok(())
    }
}
