//! Storage types

use bytes::Bytes;

/// An object fetched from storage
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl StoredObject {
    /// Size of the object body in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Receipt for a completed put
#[derive(Debug, Clone)]
pub struct PutReceipt {
    /// Key the backend stored the object under
    pub key: String,
}

/// One page of a prefix listing
#[derive(Debug, Clone)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Cursor for the next page, when `truncated` is set
    pub cursor: Option<String>,
    pub truncated: bool,
}
