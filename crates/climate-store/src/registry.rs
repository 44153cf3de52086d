//! Process-scoped dataset registry.
//!
//! Maps a `DatasetKey` to the storage location of its chunked array. The
//! mapping is built by scanning the configured backends — the local data
//! directory when present, otherwise the remote bucket listing — and is
//! replaced atomically on refresh: readers see the old map or the new one,
//! never a partial build. Concurrent refreshes coalesce onto a single
//! in-flight scan shared by every caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use walkdir::WalkDir;

use climate_common::{
    ClimateError, ClimateResult, DatasetKey, StorageLocation, DATASET_EXTENSION,
};

use crate::object_store::{ObjectStorage, ObjectStorageConfig};

/// The registry mapping, swapped wholesale on refresh.
pub type DatasetMap = HashMap<DatasetKey, StorageLocation>;

type ScanFuture = Shared<BoxFuture<'static, Result<usize, String>>>;

/// Registry of available datasets across storage backends.
#[derive(Clone)]
pub struct DatasetRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    local_dir: Option<PathBuf>,
    remote: Option<ObjectStorageConfig>,
    map: RwLock<Arc<DatasetMap>>,
    inflight: Mutex<Option<ScanFuture>>,
    scans: AtomicU64,
}

impl DatasetRegistry {
    /// Create a registry over the configured backends.
    ///
    /// The mapping starts empty; it is built lazily on the first `resolve`
    /// miss or explicitly via `refresh`.
    pub fn new(local_dir: Option<PathBuf>, remote: Option<ObjectStorageConfig>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                local_dir,
                remote,
                map: RwLock::new(Arc::new(DatasetMap::new())),
                inflight: Mutex::new(None),
                scans: AtomicU64::new(0),
            }),
        }
    }

    /// Resolve a key to its storage location.
    ///
    /// A miss triggers one refresh before failing with `DatasetNotFound`.
    pub async fn resolve(&self, key: &DatasetKey) -> ClimateResult<StorageLocation> {
        if let Some(location) = self.inner.map.read().await.get(key) {
            return Ok(location.clone());
        }

        self.refresh().await?;

        self.inner
            .map
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| ClimateError::DatasetNotFound(key.to_string()))
    }

    /// Rescan the storage backends and atomically replace the mapping.
    ///
    /// Calls arriving while a scan is in flight share its result instead of
    /// starting another scan. Returns the number of datasets found.
    pub async fn refresh(&self) -> ClimateResult<usize> {
        let fut = {
            let mut guard = self.inner.inflight.lock().await;
            match guard.as_ref() {
                Some(fut) => fut.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let fut: ScanFuture = async move {
                        // Give callers in the same scheduling burst a chance
                        // to attach before the scan runs.
                        tokio::task::yield_now().await;
                        inner.scan().await
                    }
                    .boxed()
                    .shared();
                    *guard = Some(fut.clone());
                    fut
                }
            }
        };

        let result = fut.clone().await;

        {
            let mut guard = self.inner.inflight.lock().await;
            if guard.as_ref().map(|f| f.ptr_eq(&fut)).unwrap_or(false) {
                *guard = None;
            }
        }

        result.map_err(ClimateError::StorageUnavailable)
    }

    /// Current snapshot of the mapping.
    pub async fn snapshot(&self) -> Arc<DatasetMap> {
        Arc::clone(&*self.inner.map.read().await)
    }

    /// Number of datasets in the current mapping.
    pub async fn len(&self) -> usize {
        self.inner.map.read().await.len()
    }

    /// Whether the current mapping is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of completed scans (for monitoring and tests).
    pub fn scan_count(&self) -> u64 {
        self.inner.scans.load(Ordering::Relaxed)
    }
}

impl RegistryInner {
    async fn scan(&self) -> Result<usize, String> {
        let mut map = DatasetMap::new();

        let local_dir = self.local_dir.clone().filter(|dir| dir.is_dir());

        if let Some(dir) = local_dir {
            info!(dir = %dir.display(), "Scanning local directory for datasets");

            let entries = tokio::task::spawn_blocking(move || {
                WalkDir::new(&dir)
                    .min_depth(1)
                    .max_depth(1)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_dir())
                    .map(|entry| {
                        let name = entry.file_name().to_string_lossy().into_owned();
                        (name, entry.into_path())
                    })
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(|e| format!("local scan failed: {}", e))?;

            for (name, path) in entries {
                if !name.ends_with(DATASET_EXTENSION) {
                    continue;
                }
                match DatasetKey::from_object_name(&name) {
                    Some(key) => {
                        let remote = self.remote.as_ref().map(|c| c.uri_for(&name));
                        map.insert(
                            key,
                            StorageLocation {
                                local: Some(path),
                                remote,
                            },
                        );
                    }
                    None => debug!(name = %name, "Skipping object with unparseable name"),
                }
            }
        } else if let Some(config) = &self.remote {
            info!(bucket = %config.bucket, "Scanning object store for datasets");

            let storage = ObjectStorage::new(config).map_err(|e| e.to_string())?;
            let prefixes = storage.list_prefixes().await.map_err(|e| e.to_string())?;

            for prefix in prefixes {
                let name = prefix
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .unwrap_or(prefix.as_str())
                    .to_string();
                if !name.ends_with(DATASET_EXTENSION) {
                    continue;
                }
                match DatasetKey::from_object_name(&name) {
                    Some(key) => {
                        let local = self.local_dir.as_ref().map(|d| d.join(&name));
                        map.insert(
                            key,
                            StorageLocation {
                                local,
                                remote: Some(config.uri_for(&name)),
                            },
                        );
                    }
                    None => debug!(name = %name, "Skipping object with unparseable name"),
                }
            }
        } else {
            return Err("no storage backends configured".to_string());
        }

        let count = map.len();
        info!(count, "Built dataset mapping");

        *self.map.write().await = Arc::new(map);
        self.scans.fetch_add(1, Ordering::Relaxed);

        Ok(count)
    }
}
