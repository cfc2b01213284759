//! Storage module for S3-compatible backends
//!
//! The server talks to its buckets through the [`ObjectStore`] trait so the
//! media pipeline can run against MinIO, R2 and AWS S3 in production and an
//! in-memory store in tests and local development. One store instance exists
//! per media slot (avatar, header).

mod memory;
mod s3;
mod types;

pub use memory::MemoryStore;
pub use s3::{s3_client, S3Store};
pub use types::*;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 SDK error: {0}")]
    Sdk(String),
}

/// A key-addressed binary blob store.
///
/// Single-key put and delete are atomic replace / no-op-if-absent; nothing
/// is assumed atomic across keys.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object, or `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError>;

    /// Write an object, replacing any previous value at the key.
    ///
    /// The returned receipt reports the key the backend actually stored the
    /// object under, which callers compare against the intended key.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutReceipt, StorageError>;

    /// List one page of keys under a prefix. Pass the cursor from a
    /// truncated page to fetch the next one.
    async fn list(
        &self,
        prefix: &str,
        cursor: Option<String>,
    ) -> Result<ObjectPage, StorageError>;

    /// Delete a batch of keys. Deleting an absent key is a no-op.
    async fn delete(&self, keys: &[String]) -> Result<(), StorageError>;
}
