//! Multi-period summary: target value, anomalies against the standard
//! reference periods, and the decadal trend.

use std::collections::BTreeMap;

use chrono::Datelike;

use climate_common::{PeriodSpec, SeasonFilter};

use crate::results::VariableSummary;
use crate::series::Series;

/// The four standard reference periods, in display order.
pub const REFERENCE_PERIODS: [(i32, i32); 4] =
    [(1961, 1990), (1971, 2000), (1981, 2010), (1991, 2020)];

/// Minimum yearly samples for a trend estimate.
const MIN_TREND_SAMPLES: usize = 10;

/// Summarize one variable from its seasonal-yearly series.
///
/// `yearly` is one aggregate per year over the full record; the target
/// value is the mean of its points inside the target period, anomalies are
/// target minus each reference period's mean, and the trend is the
/// least-squares slope of yearly value on year, scaled to a decade.
pub fn compute(yearly: &Series, target: &PeriodSpec, unit: &str) -> VariableSummary {
    let annual = SeasonFilter::annual();

    let value = finite(yearly.select(target, &annual).mean());

    let mut anomalies = BTreeMap::new();
    let mut ref_means = BTreeMap::new();
    for (start, end) in REFERENCE_PERIODS {
        let key = format!("{}-{}", start, end);
        let ref_mean = finite(
            yearly
                .select(&PeriodSpec::Years(start, end), &annual)
                .mean(),
        );
        let anomaly = match (value, ref_mean) {
            (Some(v), Some(r)) => Some(v - r),
            _ => None,
        };
        ref_means.insert(key.clone(), ref_mean);
        anomalies.insert(key, anomaly);
    }

    VariableSummary {
        value,
        anomalies,
        ref_means,
        trend: decadal_trend(yearly),
        unit: unit.to_string(),
    }
}

/// Least-squares slope of yearly value on year, per decade.
///
/// Returns `None` with fewer than ten finite yearly samples.
pub fn decadal_trend(yearly: &Series) -> Option<f64> {
    let points: Vec<(f64, f64)> = yearly
        .dates()
        .iter()
        .zip(yearly.values())
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (d.year() as f64, *v))
        .collect();

    if points.len() < MIN_TREND_SAMPLES {
        return None;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    Some(slope * 10.0)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use climate_common::ValueKind;

    fn yearly(years: std::ops::RangeInclusive<i32>, value: impl Fn(i32) -> f64) -> Series {
        let dates: Vec<NaiveDate> = years
            .clone()
            .map(|y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap())
            .collect();
        let values = years.map(value).collect();
        Series::new(dates, values, ValueKind::Plain)
    }

    #[test]
    fn test_four_reference_period_keys() {
        let series = yearly(1940..=2024, |y| y as f64 * 0.01);
        let summary = compute(&series, &PeriodSpec::Years(2024, 2024), "degC");

        let keys: Vec<&String> = summary.anomalies.keys().collect();
        assert_eq!(keys, vec!["1961-1990", "1971-2000", "1981-2010", "1991-2020"]);
        assert!(summary.anomalies.values().all(|a| a.is_some()));
        assert_eq!(summary.ref_means.len(), 4);
        assert_eq!(summary.unit, "degC");
    }

    #[test]
    fn test_anomaly_arithmetic() {
        // Flat 5.0 until 2019, then 8.0: the 1991-2020 reference mean is
        // (29 * 5 + 8) / 30.
        let series = yearly(1961..=2020, |y| if y < 2020 { 5.0 } else { 8.0 });
        let summary = compute(&series, &PeriodSpec::Years(2020, 2020), "mm");
        let expected_ref = (29.0 * 5.0 + 8.0) / 30.0;
        let anomaly = summary.anomalies["1991-2020"].unwrap();
        assert!((anomaly - (8.0 - expected_ref)).abs() < 1e-9);
        assert_eq!(summary.anomalies["1961-1990"].unwrap(), 3.0);
    }

    #[test]
    fn test_missing_reference_coverage() {
        let series = yearly(2000..=2024, |_| 1.0);
        let summary = compute(&series, &PeriodSpec::Years(2024, 2024), "");
        // 1961-1990 has no yearly points at all.
        assert!(summary.anomalies["1961-1990"].is_none());
        assert!(summary.anomalies["1991-2020"].is_some());
    }

    #[test]
    fn test_trend_recovers_linear_slope() {
        // 0.02 per year is 0.2 per decade.
        let series = yearly(1940..=2020, |y| 0.02 * y as f64);
        let trend = decadal_trend(&series).unwrap();
        assert!((trend - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_trend_needs_ten_samples() {
        let series = yearly(2016..=2024, |y| y as f64);
        assert!(decadal_trend(&series).is_none());
    }
}
