//! In-memory storage backend
//!
//! Used by the test suite and for running the server locally without an
//! S3 endpoint. Listing walks keys in lexicographic order and paginates
//! with plain key cursors, mirroring the shape of `list_objects_v2`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectPage, ObjectStore, PutReceipt, StorageError, StoredObject};

const DEFAULT_PAGE_SIZE: usize = 1000;

/// Object store held entirely in process memory
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, (Bytes, String)>>,
    page_size: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create a store that returns at most `page_size` keys per list page.
    /// Small page sizes exercise pagination paths in tests.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        let objects = self.objects.lock().expect("store lock poisoned");

        Ok(objects.get(key).map(|(data, content_type)| StoredObject {
            key: key.to_string(),
            content_type: Some(content_type.clone()),
            data: data.clone(),
        }))
    }

    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutReceipt, StorageError> {
        let mut objects = self.objects.lock().expect("store lock poisoned");
        objects.insert(key.to_string(), (data, content_type.to_string()));

        Ok(PutReceipt {
            key: key.to_string(),
        })
    }

    async fn list(
        &self,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ObjectPage, StorageError> {
        let objects = self.objects.lock().expect("store lock poisoned");

        let keys: Vec<String> = objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| cursor.as_deref().map_or(true, |c| key.as_str() > c))
            .take(self.page_size + 1)
            .cloned()
            .collect();

        let truncated = keys.len() > self.page_size;
        let keys: Vec<String> = keys.into_iter().take(self.page_size).collect();
        let cursor = if truncated {
            keys.last().cloned()
        } else {
            None
        };

        Ok(ObjectPage {
            keys,
            cursor,
            truncated,
        })
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut objects = self.objects.lock().expect("store lock poisoned");
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}
