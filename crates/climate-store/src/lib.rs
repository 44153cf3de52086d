//! Storage tier for the climate-stats workspace.
//!
//! Owns the two process-wide caches: the dataset registry (key to storage
//! location, single-flight refresh over local and remote backends) and the
//! region catalog (mask/weight definitions per region set). Both hand out
//! immutable snapshots; everything downstream is request-local.

pub mod object_store;
pub mod registry;
pub mod regions;

pub use crate::object_store::{ObjectStorage, ObjectStorageConfig};
pub use crate::regions::{MaskCell, RegionCatalog, RegionMask, RegionSet};
pub use crate::registry::{DatasetMap, DatasetRegistry};
