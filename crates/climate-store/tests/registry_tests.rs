//! Registry scanning and refresh-coalescing behavior.

use std::fs;

use climate_common::{ClimateError, DatasetKey};
use climate_store::DatasetRegistry;

fn seed_local_dir(dir: &std::path::Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(dir.join(name)).expect("create dataset dir");
    }
}

#[tokio::test]
async fn test_local_scan_builds_mapping() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_local_dir(
        tmp.path(),
        &["tas_None_ERA5_NUTS-0.zarr", "pr_None_ERA5_NUTS-0.zarr"],
    );

    let registry = DatasetRegistry::new(Some(tmp.path().to_path_buf()), None);
    let count = registry.refresh().await.expect("refresh");
    assert_eq!(count, 2);

    let key = DatasetKey::new("tas", "None", "ERA5", "NUTS-0");
    let location = registry.resolve(&key).await.expect("resolve");
    assert_eq!(
        location.local.as_deref(),
        Some(tmp.path().join("tas_None_ERA5_NUTS-0.zarr").as_path())
    );
    assert_eq!(location.remote, None);
}

#[tokio::test]
async fn test_scan_skips_malformed_names() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_local_dir(
        tmp.path(),
        &[
            "tas_None_ERA5_NUTS-0.zarr",
            "not-a-dataset.zarr",
            "too_many_parts_in_this_name.zarr",
        ],
    );
    // A stray plain file must not trip the scan either.
    fs::write(tmp.path().join("README.md"), "notes").expect("write file");

    let registry = DatasetRegistry::new(Some(tmp.path().to_path_buf()), None);
    let count = registry.refresh().await.expect("refresh");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_unknown_key_fails_after_forced_refresh() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_local_dir(tmp.path(), &["tas_None_ERA5_NUTS-0.zarr"]);

    let registry = DatasetRegistry::new(Some(tmp.path().to_path_buf()), None);

    let missing = DatasetKey::new("tasmax", "None", "ERA5", "NUTS-0");
    let err = registry.resolve(&missing).await.unwrap_err();
    assert!(matches!(err, ClimateError::DatasetNotFound(_)));
    // The miss must have triggered a real scan, not returned silently.
    assert_eq!(registry.scan_count(), 1);
}

#[tokio::test]
async fn test_concurrent_refreshes_coalesce() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_local_dir(tmp.path(), &["tas_None_ERA5_NUTS-0.zarr"]);

    let registry = DatasetRegistry::new(Some(tmp.path().to_path_buf()), None);

    // Drive several refresh futures from one task so they are polled in the
    // same scheduling burst; they must share a single scan.
    let (a, b, c, d) = tokio::join!(
        registry.refresh(),
        registry.refresh(),
        registry.refresh(),
        registry.refresh(),
    );
    assert_eq!(a.expect("refresh"), 1);
    assert_eq!(b.expect("refresh"), 1);
    assert_eq!(c.expect("refresh"), 1);
    assert_eq!(d.expect("refresh"), 1);
    assert_eq!(registry.scan_count(), 1);

    // A later refresh is a new scan.
    registry.refresh().await.expect("refresh");
    assert_eq!(registry.scan_count(), 2);
}

#[tokio::test]
async fn test_refresh_picks_up_new_datasets() {
    let tmp = tempfile::tempdir().expect("tempdir");
    seed_local_dir(tmp.path(), &["tas_None_ERA5_NUTS-0.zarr"]);

    let registry = DatasetRegistry::new(Some(tmp.path().to_path_buf()), None);
    registry.refresh().await.expect("refresh");
    assert_eq!(registry.len().await, 1);

    seed_local_dir(tmp.path(), &["sfcWind_None_ERA5_NUTS-0.zarr"]);
    registry.refresh().await.expect("refresh");
    assert_eq!(registry.len().await, 2);
}

#[tokio::test]
async fn test_no_backends_is_storage_unavailable() {
    let registry = DatasetRegistry::new(None, None);
    let err = registry.refresh().await.unwrap_err();
    assert!(matches!(err, ClimateError::StorageUnavailable(_)));
}
