//! Object storage interface for dataset listings (MinIO/S3 compatible).

use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use climate_common::{ClimateError, ClimateResult};

/// Configuration for object storage connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStorageConfig {
    /// S3/MinIO endpoint URL
    pub endpoint: String,
    /// Bucket name
    pub bucket: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// AWS region (use "us-east-1" for MinIO)
    pub region: String,
    /// Allow HTTP (for local MinIO)
    pub allow_http: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://minio:9000".to_string(),
            bucket: "climate-data".to_string(),
            access_key_id: "minioadmin".to_string(),
            secret_access_key: "minioadmin".to_string(),
            region: "us-east-1".to_string(),
            allow_http: true,
        }
    }
}

impl ObjectStorageConfig {
    /// Create config from environment variables.
    ///
    /// Returns `None` when no endpoint is configured; the registry then
    /// scans local storage only.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("S3_ENDPOINT").ok()?;
        Some(Self {
            endpoint,
            bucket: std::env::var("S3_BUCKET").unwrap_or_else(|_| "climate-data".to_string()),
            access_key_id: std::env::var("S3_ACCESS_KEY").unwrap_or_default(),
            secret_access_key: std::env::var("S3_SECRET_KEY").unwrap_or_default(),
            region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            allow_http: std::env::var("S3_ALLOW_HTTP")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Remote URI for an object name in this bucket.
    pub fn uri_for(&self, object_name: &str) -> String {
        format!("s3://{}/{}", self.bucket, object_name)
    }
}

/// Object storage client for dataset discovery.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a new object storage client from config.
    pub fn new(config: &ObjectStorageConfig) -> ClimateResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_endpoint(&config.endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region(&config.region);

        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| ClimateError::storage(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: config.bucket.clone(),
        })
    }

    /// List top-level prefixes in the bucket (one per dataset directory).
    ///
    /// Dataset objects are directories of chunks; listing with a delimiter
    /// returns each `name.zarr/` prefix once instead of every chunk key.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn list_prefixes(&self) -> ClimateResult<Vec<String>> {
        let result = self
            .store
            .list_with_delimiter(None)
            .await
            .map_err(|e| ClimateError::storage(format!("List failed: {}", e)))?;

        let prefixes: Vec<String> = result
            .common_prefixes
            .iter()
            .map(|p| p.to_string())
            .collect();

        debug!(count = prefixes.len(), "Listed dataset prefixes");
        Ok(prefixes)
    }

    /// Check if an object exists.
    pub async fn exists(&self, path: &str) -> ClimateResult<bool> {
        let location = Path::from(path);

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(ClimateError::storage(format!(
                "Failed to check {}: {}",
                path, e
            ))),
        }
    }
}
