//! Time series: resampled values, optionally as anomalies.

use climate_common::{AggFunc, PeriodSpec, ResampleFreq, SeasonFilter};

use crate::results::TimeSeries;
use crate::series::Series;

/// Resample the filtered series; anomaly mode subtracts the mean of the
/// reference period's identically-resampled selection.
pub fn compute(
    series: &Series,
    period: &PeriodSpec,
    season: &SeasonFilter,
    freq: ResampleFreq,
    func: AggFunc,
    reference: Option<&PeriodSpec>,
) -> TimeSeries {
    let mut resampled = series.select(period, season).resample(freq, func);

    if let Some(reference) = reference {
        let baseline = series
            .select(reference, season)
            .resample(freq, func)
            .mean();
        resampled = resampled.offset(baseline);
    }

    TimeSeries {
        date: resampled
            .dates()
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
        value: resampled.values().to_vec(),
    }
}
