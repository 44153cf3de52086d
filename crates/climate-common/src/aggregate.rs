//! Closed enumerations for aggregation functions and resampling frequencies.
//!
//! Requests carry these as strings; unknown names are rejected at parse time
//! rather than at compute time.

use serde::{Deserialize, Serialize};

use crate::error::{ClimateError, ClimateResult};

/// Supported aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFunc {
    Mean,
    Sum,
    Min,
    Max,
    Std,
    Median,
}

impl AggFunc {
    /// Parse a function name as requests spell it ("mean", "sum", ...).
    pub fn parse(input: &str) -> ClimateResult<Self> {
        match input.trim() {
            "mean" => Ok(AggFunc::Mean),
            "sum" => Ok(AggFunc::Sum),
            "min" => Ok(AggFunc::Min),
            "max" => Ok(AggFunc::Max),
            "std" => Ok(AggFunc::Std),
            "median" => Ok(AggFunc::Median),
            other => Err(ClimateError::invalid_period(
                other,
                "unknown aggregation function",
            )),
        }
    }

    /// Apply the function over a sample, skipping NaN entries.
    ///
    /// Returns NaN when no finite sample remains.
    pub fn apply(&self, values: &[f64]) -> f64 {
        let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return f64::NAN;
        }
        let n = finite.len() as f64;
        match self {
            AggFunc::Mean => finite.iter().sum::<f64>() / n,
            AggFunc::Sum => finite.iter().sum(),
            AggFunc::Min => finite.iter().copied().fold(f64::INFINITY, f64::min),
            AggFunc::Max => finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggFunc::Std => {
                let mean = finite.iter().sum::<f64>() / n;
                let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                var.sqrt()
            }
            AggFunc::Median => {
                finite.sort_by(|a, b| a.partial_cmp(b).expect("finite values"));
                let mid = finite.len() / 2;
                if finite.len() % 2 == 0 {
                    (finite[mid - 1] + finite[mid]) / 2.0
                } else {
                    finite[mid]
                }
            }
        }
    }
}

/// Supported resampling frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResampleFreq {
    Daily,
    Monthly,
    Annual,
}

impl ResampleFreq {
    /// Parse the pandas-style frequency tokens dashboards send.
    pub fn parse(input: &str) -> ClimateResult<Self> {
        match input.trim() {
            "D" => Ok(ResampleFreq::Daily),
            "M" | "MS" => Ok(ResampleFreq::Monthly),
            "Y" | "YS" | "A" | "AS" => Ok(ResampleFreq::Annual),
            other => Err(ClimateError::invalid_period(
                other,
                "unknown resample frequency",
            )),
        }
    }
}
