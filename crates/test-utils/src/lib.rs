//! Shared test fixtures for the climate-stats workspace.
//!
//! Provides writers for synthetic Zarr datasets in the layout the engine
//! loads, and for region-set definition files. Test-only; not published.

pub mod fixtures;

pub use fixtures::{
    write_duration_dataset, write_float_dataset, write_region_set, DatasetSpec,
};
