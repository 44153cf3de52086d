//! Typed query results.
//!
//! One struct per product; every numeric leaf has already passed through
//! the type normalizer by the time a result is constructed. Results are
//! built once per request and returned to the API layer; nothing is
//! persisted.

use std::collections::BTreeMap;

use serde::Serialize;

/// A resampled series of values over time.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSeries {
    /// Dates, formatted YYYY-MM-DD.
    pub date: Vec<String>,
    /// One value per date.
    pub value: Vec<f64>,
}

/// One aggregate value per region of a region set.
#[derive(Debug, Clone, Serialize)]
pub struct ClimatologyMap {
    pub region: Vec<String>,
    pub value: Vec<f64>,
}

/// Per-date annual cycle with reference-period bands.
#[derive(Debug, Clone, Serialize)]
pub struct AnnualCycle {
    pub date: Vec<String>,
    pub value: Vec<f64>,
    pub percentile90: Vec<f64>,
    pub median: Vec<f64>,
    pub percentile10: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub higher_than_max: Vec<bool>,
    pub lower_than_min: Vec<bool>,
}

/// Minimum and maximum observation of a filtered selection.
#[derive(Debug, Clone, Serialize)]
pub struct ExtremeValues {
    pub date_min: String,
    pub value_min: f64,
    pub date_max: String,
    pub value_max: f64,
}

/// Frequency histograms of a target and a reference period over shared
/// bin edges, plus each period's modal bin.
#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    /// Bin centers, identical for both periods.
    pub bins: Vec<f64>,
    pub value_period: Vec<u64>,
    pub value_reference: Vec<u64>,
    pub mode_value_period: Option<f64>,
    pub mode_date_period: Option<String>,
    pub mode_value_reference: Option<f64>,
    pub mode_date_reference: Option<String>,
}

/// Summary of one variable against the standard reference periods.
#[derive(Debug, Clone, Serialize)]
pub struct VariableSummary {
    /// Aggregate over the target period and season.
    pub value: Option<f64>,
    /// Target value minus each reference period's mean.
    pub anomalies: BTreeMap<String, Option<f64>>,
    /// Mean of yearly values per reference period.
    pub ref_means: BTreeMap<String, Option<f64>>,
    /// Least-squares slope of yearly values, per decade.
    pub trend: Option<f64>,
    /// Units after load-time conversion.
    pub unit: String,
}

/// Summary statistics for one or more variables.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub stats: BTreeMap<String, VariableSummary>,
}

/// The six product shapes a query can produce.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum QueryResult {
    TimeSeries(TimeSeries),
    ClimatologyMap(ClimatologyMap),
    AnnualCycle(AnnualCycle),
    ExtremeValues(ExtremeValues),
    Histogram(Histogram),
    SummaryStats(SummaryStats),
}
