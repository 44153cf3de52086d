//! Storage backends for Zarr access.
//!
//! This module provides helper functions for creating the two storage
//! backends the loader tries in order: the local filesystem and an
//! S3-compatible object store wrapped for the synchronous zarrs API.

use std::path::Path;
use std::sync::Arc;

// Use the direct object_store crate (version must match what zarrs_object_store uses)
use object_store::aws::AmazonS3Builder;
use zarrs_filesystem::FilesystemStore;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};
use zarrs_storage::ReadableStorageTraits;

use climate_common::{ClimateError, ClimateResult};
use climate_store::ObjectStorageConfig;

/// Blocking executor that works from within a tokio runtime.
///
/// Uses `tokio::task::block_in_place` to move the current task to a blocking
/// thread, then uses the runtime handle to drive the future. This avoids the
/// "cannot start a runtime from within a runtime" error.
#[derive(Clone, Copy)]
pub struct TokioBlockOn;

impl AsyncToSyncBlockOn for TokioBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        // block_in_place moves the current task off the async worker thread
        // so we can safely call block_on without nesting runtimes
        tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
    }
}

/// Readable storage handle shared by both backends.
pub type DynStorage = Arc<dyn ReadableStorageTraits>;

/// Storage type for S3-backed Zarr access (sync adapter over the async client).
pub type RemoteStore = AsyncToSyncStorageAdapter<AsyncObjectStore<object_store::aws::AmazonS3>, TokioBlockOn>;

/// Open a local dataset directory as a Zarr store.
pub fn open_local_store(path: &Path) -> ClimateResult<DynStorage> {
    let store = FilesystemStore::new(path)
        .map_err(|e| ClimateError::storage(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(Arc::new(store))
}

/// Create an S3-compatible storage backend for Zarr access.
///
/// Builds an object_store client, wraps it in `AsyncObjectStore`, then in
/// the async-to-sync adapter so the synchronous zarrs API can drive it.
pub fn open_remote_store(config: &ObjectStorageConfig) -> ClimateResult<DynStorage> {
    let s3 = AmazonS3Builder::new()
        .with_endpoint(&config.endpoint)
        .with_bucket_name(&config.bucket)
        .with_access_key_id(&config.access_key_id)
        .with_secret_access_key(&config.secret_access_key)
        .with_region(&config.region)
        .with_allow_http(config.allow_http)
        .build()
        .map_err(|e| ClimateError::storage(format!("Failed to create S3 client: {}", e)))?;

    let async_store = Arc::new(AsyncObjectStore::new(s3));
    let sync_store: RemoteStore = AsyncToSyncStorageAdapter::new(async_store, TokioBlockOn);

    Ok(Arc::new(sync_store))
}
