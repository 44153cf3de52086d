//! Synthetic dataset and region fixtures.
//!
//! Writes small Zarr datasets in the layout the loader expects — a group
//! directory named `{variable}_{level}_{dataset}_{region_set}.zarr` holding
//! the variable array (time, y, x) and a CF-encoded `time` coordinate —
//! plus region-set definition files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use zarrs::array::{Array, ArrayBuilder, ChunkGrid, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs_filesystem::FilesystemStore;

/// Shape and naming of a synthetic dataset.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    /// Object name, e.g. "tas_None_ERA5_TEST.zarr".
    pub name: String,
    /// Variable array name inside the group, e.g. "tas".
    pub variable: String,
    /// Units attribute written on the variable.
    pub units: String,
    /// First day of the time axis.
    pub start: NaiveDate,
    /// Number of daily steps.
    pub days: usize,
    /// Grid rows.
    pub ny: usize,
    /// Grid columns.
    pub nx: usize,
}

impl DatasetSpec {
    pub fn new(
        name: &str,
        variable: &str,
        units: &str,
        start: NaiveDate,
        days: usize,
        ny: usize,
        nx: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            variable: variable.to_string(),
            units: units.to_string(),
            start,
            days,
            ny,
            nx,
        }
    }
}

/// Write a float64 dataset; `value(t, row, col)` fills the grid.
///
/// Returns the dataset directory.
pub fn write_float_dataset(
    root: &Path,
    spec: &DatasetSpec,
    value: impl Fn(usize, usize, usize) -> f64,
) -> PathBuf {
    let (dir, store) = dataset_store(root, &spec.name);

    let mut data = Vec::with_capacity(spec.days * spec.ny * spec.nx);
    for t in 0..spec.days {
        for row in 0..spec.ny {
            for col in 0..spec.nx {
                data.push(value(t, row, col));
            }
        }
    }

    let array = build_array(
        store.clone(),
        &format!("/{}", spec.variable),
        spec,
        DataType::Float64,
        FillValue::from(f64::NAN),
    );
    store_all(&array, spec, &data);

    write_time_axis(store, spec);
    dir
}

/// Write an int64 timedelta dataset; `days(t, row, col)` fills the grid
/// with counts of days.
pub fn write_duration_dataset(
    root: &Path,
    spec: &DatasetSpec,
    days: impl Fn(usize, usize, usize) -> i64,
) -> PathBuf {
    let (dir, store) = dataset_store(root, &spec.name);

    let mut data = Vec::with_capacity(spec.days * spec.ny * spec.nx);
    for t in 0..spec.days {
        for row in 0..spec.ny {
            for col in 0..spec.nx {
                data.push(days(t, row, col));
            }
        }
    }

    let array = build_array(
        store.clone(),
        &format!("/{}", spec.variable),
        spec,
        DataType::Int64,
        FillValue::from(i64::MIN),
    );
    store_all(&array, spec, &data);

    write_time_axis(store, spec);
    dir
}

/// Write a region-set definition file with sparse `[row, col, weight]`
/// cells per region.
pub fn write_region_set(
    dir: &Path,
    name: &str,
    ny: usize,
    nx: usize,
    regions: &[(&str, &[(usize, usize, f64)])],
) {
    let regions_json: serde_json::Map<String, serde_json::Value> = regions
        .iter()
        .map(|(id, cells)| {
            let cells: Vec<serde_json::Value> = cells
                .iter()
                .map(|(row, col, weight)| serde_json::json!([row, col, weight]))
                .collect();
            (id.to_string(), serde_json::json!({ "cells": cells }))
        })
        .collect();

    let body = serde_json::json!({
        "grid": { "ny": ny, "nx": nx },
        "regions": regions_json,
    });

    std::fs::create_dir_all(dir).expect("create regions dir");
    std::fs::write(
        dir.join(format!("{}.json", name)),
        serde_json::to_string_pretty(&body).expect("serialize region set"),
    )
    .expect("write region set");
}

fn dataset_store(root: &Path, name: &str) -> (PathBuf, Arc<FilesystemStore>) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).expect("create dataset dir");
    let store = FilesystemStore::new(&dir).expect("open filesystem store");
    (dir, Arc::new(store))
}

fn build_array(
    store: Arc<FilesystemStore>,
    path: &str,
    spec: &DatasetSpec,
    data_type: DataType,
    fill_value: FillValue,
) -> Array<FilesystemStore> {
    // Chunk along time so multi-run selections exercise more than one read.
    let chunk_days = spec.days.clamp(1, 128) as u64;
    let chunk_grid: ChunkGrid = vec![chunk_days, spec.ny as u64, spec.nx as u64]
        .try_into()
        .expect("chunk grid");

    let mut attrs = serde_json::Map::new();
    attrs.insert("units".to_string(), serde_json::json!(spec.units));

    let array = ArrayBuilder::new(
        vec![spec.days as u64, spec.ny as u64, spec.nx as u64],
        data_type,
        chunk_grid,
        fill_value,
    )
    .attributes(attrs)
    .build(store, path)
    .expect("build array");

    array.store_metadata().expect("store metadata");
    array
}

fn store_all<T: zarrs::array::Element + Copy>(
    array: &Array<FilesystemStore>,
    spec: &DatasetSpec,
    data: &[T],
) {
    let subset = ArraySubset::new_with_start_shape(
        vec![0, 0, 0],
        vec![spec.days as u64, spec.ny as u64, spec.nx as u64],
    )
    .expect("subset");
    array
        .store_array_subset_elements(&subset, data)
        .expect("store data");
}

fn write_time_axis(store: Arc<FilesystemStore>, spec: &DatasetSpec) {
    let chunk_grid: ChunkGrid = vec![spec.days as u64].try_into().expect("chunk grid");

    let mut attrs = serde_json::Map::new();
    attrs.insert(
        "units".to_string(),
        serde_json::json!(format!("days since {}", spec.start.format("%Y-%m-%d"))),
    );

    let array = ArrayBuilder::new(
        vec![spec.days as u64],
        DataType::Int64,
        chunk_grid,
        FillValue::from(0i64),
    )
    .attributes(attrs)
    .build(store, "/time")
    .expect("build time array");

    array.store_metadata().expect("store time metadata");

    let offsets: Vec<i64> = (0..spec.days as i64).collect();
    let subset =
        ArraySubset::new_with_start_shape(vec![0], vec![spec.days as u64]).expect("subset");
    array
        .store_array_subset_elements(&subset, &offsets)
        .expect("store time data");
}
