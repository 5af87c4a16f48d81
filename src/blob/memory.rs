//! In-process blob store backend.

use super::{BlobError, BlobStore};
use async_trait::async_trait;
use dashmap::DashMap;

/// DashMap-backed blob store for tests and development.
pub struct MemoryBlobStore {
    objects: DashMap<String, Vec<u8>>,
    public_base: String,
}

impl MemoryBlobStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        Self {
            objects: DashMap::new(),
            public_base: public_base.into(),
        }
    }

    pub fn object_size(&self, key: &str) -> Option<usize> {
        self.objects.get(key).map(|data| data.len())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BlobError> {
        log::debug!("MemoryBlobStore: put {} ({} bytes)", key, data.len());
        self.objects.insert(key.to_string(), data);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base.trim_end_matches('/'), key)
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.objects.contains_key(key))
    }
}
