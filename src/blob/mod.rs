//! Blob store abstraction for image uploads.
//!
//! Supports multiple backends:
//! - `memory`: in-process store for tests and development
//! - `s3`: S3-compatible object storage (MinIO, AWS S3, etc.)

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

/// Blob store operation errors.
#[derive(Debug)]
pub enum BlobError {
    /// Object not found
    NotFound(String),
    /// Backend failure
    Backend(String),
}

impl std::fmt::Display for BlobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobError::NotFound(msg) => write!(f, "Not found: {}", msg),
            BlobError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for BlobError {}

/// An image supplied with a create or edit action, not yet uploaded.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    /// Original file name; only the extension is kept.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Storage key for this upload: `{owner}-{millis}-{nonce}.{ext}`.
    /// The nonce keeps two uploads by the same owner in the same
    /// millisecond from overwriting each other.
    pub fn key_for(&self, owner_id: Uuid) -> String {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("bin");
        format!(
            "{}-{}-{}.{}",
            owner_id,
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            ext
        )
    }
}

/// Trait for blob store backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object under `key`.
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BlobError>;

    /// Publicly reachable URL for `key`.
    fn public_url(&self, key: &str) -> String;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> Result<bool, BlobError>;
}
