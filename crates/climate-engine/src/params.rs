//! Request parameter structs.
//!
//! These arrive pre-validated from the API layer as strings and booleans;
//! the service parses them into the typed vocabulary (periods, seasons,
//! aggregation enums) and fails fast with `InvalidPeriodFormat` on
//! malformed values.

use serde::Deserialize;

fn default_resample_freq() -> String {
    "MS".to_string()
}

fn default_mean() -> String {
    "mean".to_string()
}

fn default_period_all() -> String {
    "all".to_string()
}

fn default_season_annual() -> String {
    "01-12".to_string()
}

fn default_histogram_reference() -> String {
    "1950-1990".to_string()
}

/// Parameters for time series requests.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesParams {
    pub dataset: String,
    pub region_set: String,
    pub region_name: String,
    /// Combined variable name ("tas_None").
    pub variable: String,
    #[serde(default = "default_resample_freq")]
    pub resample_freq: String,
    #[serde(default = "default_mean")]
    pub resample_func: String,
    #[serde(default = "default_period_all")]
    pub period: String,
    #[serde(default = "default_season_annual")]
    pub season_filter: String,
    #[serde(default)]
    pub anomaly: bool,
    #[serde(default)]
    pub reference_period: Option<String>,
}

/// Parameters for climatology map requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ClimatologyMapParams {
    pub dataset: String,
    pub region_set: String,
    /// Semicolon-separated region ids; empty selects the whole set.
    #[serde(default)]
    pub region_name: String,
    pub variable: String,
    #[serde(default = "default_period_all")]
    pub period: String,
    #[serde(default = "default_season_annual")]
    pub season_filter: String,
    #[serde(default = "default_mean")]
    pub season_filter_func: String,
    #[serde(default)]
    pub anomaly: bool,
    #[serde(default)]
    pub reference_period: Option<String>,
}

/// Parameters for annual cycle requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnualCycleParams {
    pub dataset: String,
    pub region_set: String,
    pub region_name: String,
    pub variable: String,
    pub period: String,
    pub reference_period: String,
}

/// Parameters for extreme value requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtremeValuesParams {
    pub dataset: String,
    pub region_set: String,
    pub region_name: String,
    pub variable: String,
    #[serde(default = "default_period_all")]
    pub period: String,
    #[serde(default = "default_season_annual")]
    pub season_filter: String,
}

/// Parameters for histogram requests.
#[derive(Debug, Clone, Deserialize)]
pub struct HistogramParams {
    pub dataset: String,
    pub region_set: String,
    pub region_name: String,
    pub variable: String,
    #[serde(default = "default_period_all")]
    pub period: String,
    #[serde(default = "default_histogram_reference")]
    pub reference_period: String,
    #[serde(default = "default_season_annual")]
    pub season_filter: String,
}

/// Parameters for summary statistics requests.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryStatsParams {
    pub dataset: String,
    pub region_set: String,
    pub region_name: String,
    /// One combined variable name, or several separated by semicolons.
    pub variable: String,
    pub period: String,
    #[serde(default = "default_season_annual")]
    pub season_filter: String,
    #[serde(default = "default_mean")]
    pub season_filter_func: String,
}

impl SummaryStatsParams {
    /// Split the semicolon-separated variable list.
    pub fn variables(&self) -> Vec<&str> {
        self.variable
            .split(';')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_series_defaults() {
        let params: TimeSeriesParams = serde_json::from_str(
            r#"{
                "dataset": "ERA5",
                "region_set": "NUTS-0",
                "region_name": "ES",
                "variable": "tas_None"
            }"#,
        )
        .unwrap();
        assert_eq!(params.resample_freq, "MS");
        assert_eq!(params.resample_func, "mean");
        assert_eq!(params.period, "all");
        assert_eq!(params.season_filter, "01-12");
        assert!(!params.anomaly);
        assert!(params.reference_period.is_none());
    }

    #[test]
    fn test_summary_variable_list() {
        let params: SummaryStatsParams = serde_json::from_str(
            r#"{
                "dataset": "ERA5",
                "region_set": "NUTS-0",
                "region_name": "FR",
                "variable": "tas_None; pr_None;",
                "period": "2024-2024"
            }"#,
        )
        .unwrap();
        assert_eq!(params.variables(), vec!["tas_None", "pr_None"]);
    }
}
