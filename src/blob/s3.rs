//! S3-compatible blob store backend.

use super::{BlobError, BlobStore};
use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_s3::{ListObjectsV2Request, PutObjectRequest, S3Client, S3};

/// S3-compatible blob store.
pub struct S3BlobStore {
    s3: S3Client,
    bucket: String,
    pub_url: String,
}

impl S3BlobStore {
    /// Create a new S3 blob store.
    pub fn new(region: Region, bucket: String, pub_url: String) -> S3BlobStore {
        log::info!("S3BlobStore initialized for bucket: {}", bucket);

        S3BlobStore {
            s3: S3Client::new(region),
            bucket,
            pub_url,
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), BlobError> {
        log::info!("S3BlobStore: put: {}", key);

        let put_request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            body: Some(data.into()),
            ..Default::default()
        };

        self.s3
            .put_object(put_request)
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.pub_url.trim_end_matches('/'), self.bucket, key)
    }

    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        log::debug!("S3BlobStore: exists: {}", key);

        // Using list_objects_v2 is reportedly faster than head_object
        // https://www.peterbe.com/plog/fastest-way-to-find-out-if-a-file-exists-in-s3
        let list_request = ListObjectsV2Request {
            bucket: self.bucket.clone(),
            prefix: Some(key.to_owned()),
            ..Default::default()
        };

        let result = self
            .s3
            .list_objects_v2(list_request)
            .await
            .map_err(|e| BlobError::Backend(e.to_string()))?;

        let count = result.key_count.unwrap_or(0);
        Ok(count > 0)
    }
}
