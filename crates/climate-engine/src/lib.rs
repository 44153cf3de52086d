//! Statistical computation pipeline over chunked climate arrays.
//!
//! This crate turns a resolved dataset into one of six statistical
//! products over a named region. It provides:
//!
//! - **Lazy loading**: Zarr arrays open local-first with remote fallback;
//!   only chunk metadata and the time coordinate are read eagerly
//! - **Deferred plans**: selections and reductions are recorded on a
//!   `QueryPlan` and evaluated at one `materialize()` point per request
//! - **Shared conventions**: period parsing, season wraparound and
//!   reference-period semantics agree across all six products
//!
//! # Architecture
//!
//! ```text
//! Query parameters
//!      │
//!      ▼
//! ClimateDataService
//!      │
//!      ├─► DatasetRegistry::resolve (key → storage location)
//!      │
//!      ├─► ClimateArray::open (local, then remote)
//!      │
//!      ├─► TimeSelection + QueryPlan::reduce (region weights)
//!      │
//!      ├─► QueryPlan::materialize (chunked reads, weighted means)
//!      │
//!      ├─► Series::normalize (duration counts → float days)
//!      │
//!      └─► stats::{time_series, climatology_map, annual_cycle,
//!                  extreme_values, histogram, summary}
//!               │
//!               ▼
//!          QueryResult to the API layer
//! ```

pub mod config;
pub mod framer;
pub mod loader;
pub mod params;
pub mod plan;
pub mod results;
pub mod series;
pub mod service;
pub mod stats;
pub mod storage;

// Re-export commonly used types at crate root
pub use config::EngineConfig;
pub use framer::{materialization_period, seasonal_yearly, TimeSelection};
pub use loader::ClimateArray;
pub use params::{
    AnnualCycleParams, ClimatologyMapParams, ExtremeValuesParams, HistogramParams,
    SummaryStatsParams, TimeSeriesParams,
};
pub use plan::QueryPlan;
pub use results::{
    AnnualCycle, ClimatologyMap, ExtremeValues, Histogram, QueryResult, SummaryStats, TimeSeries,
    VariableSummary,
};
pub use series::Series;
pub use service::ClimateDataService;
