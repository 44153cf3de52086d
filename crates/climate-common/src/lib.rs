//! Shared vocabulary for the climate-stats workspace.
//!
//! This crate defines the types every tier agrees on: the error kinds, the
//! dataset key and storage location, period/season parsing, the closed
//! aggregation enumerations, and the tagged value kind with its normalizer.

pub mod aggregate;
pub mod error;
pub mod key;
pub mod period;
pub mod value;

pub use aggregate::{AggFunc, ResampleFreq};
pub use error::{ClimateError, ClimateResult};
pub use key::{DatasetKey, StorageLocation, DATASET_EXTENSION};
pub use period::{PeriodSpec, SeasonFilter};
pub use value::{normalize, ValueKind, NANOS_PER_DAY};
