//! Annual cycle: daily values against reference-period day-of-year bands.

use std::collections::BTreeMap;

use chrono::Datelike;

use climate_common::{PeriodSpec, SeasonFilter};

use crate::results::AnnualCycle;
use crate::series::Series;
use crate::stats::percentile;

/// Window of the centered rolling mean applied to the percentile bands.
const SMOOTHING_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy)]
struct DayStats {
    percentile90: f64,
    median: f64,
    percentile10: f64,
    min: f64,
    max: f64,
}

/// Compare the target period's daily values against day-of-year statistics
/// of the reference period.
///
/// Reference percentiles use linear interpolation. All five bands are
/// smoothed with the same centered rolling mean, wrapping across the year
/// boundary; identical weights keep the per-day ordering
/// min <= p10 <= median <= p90 <= max intact.
pub fn compute(series: &Series, period: &PeriodSpec, reference: &PeriodSpec) -> AnnualCycle {
    let annual = SeasonFilter::annual();
    let reference_series = series.select(reference, &annual);

    // Group reference samples by month-day.
    let mut groups: BTreeMap<(u32, u32), Vec<f64>> = BTreeMap::new();
    for (date, value) in reference_series.dates().iter().zip(reference_series.values()) {
        groups.entry((date.month(), date.day())).or_default().push(*value);
    }

    let keys: Vec<(u32, u32)> = groups.keys().copied().collect();
    let mut stats: Vec<DayStats> = keys
        .iter()
        .map(|key| {
            let samples = &groups[key];
            DayStats {
                percentile90: percentile(samples, 90.0),
                median: percentile(samples, 50.0),
                percentile10: percentile(samples, 10.0),
                min: samples.iter().copied().filter(|v| v.is_finite()).fold(f64::INFINITY, f64::min),
                max: samples
                    .iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect();
    for day in &mut stats {
        if day.min == f64::INFINITY {
            day.min = f64::NAN;
        }
        if day.max == f64::NEG_INFINITY {
            day.max = f64::NAN;
        }
    }

    let p90 = smooth_wrapped(&stats.iter().map(|s| s.percentile90).collect::<Vec<_>>());
    let med = smooth_wrapped(&stats.iter().map(|s| s.median).collect::<Vec<_>>());
    let p10 = smooth_wrapped(&stats.iter().map(|s| s.percentile10).collect::<Vec<_>>());
    let mins = smooth_wrapped(&stats.iter().map(|s| s.min).collect::<Vec<_>>());
    let maxs = smooth_wrapped(&stats.iter().map(|s| s.max).collect::<Vec<_>>());
    for (i, day) in stats.iter_mut().enumerate() {
        day.percentile90 = p90[i];
        day.median = med[i];
        day.percentile10 = p10[i];
        day.min = mins[i];
        day.max = maxs[i];
    }

    let index_of: BTreeMap<(u32, u32), usize> =
        keys.iter().copied().enumerate().map(|(i, k)| (k, i)).collect();

    let target = series.select(period, &annual);
    let n = target.len();
    let mut result = AnnualCycle {
        date: Vec::with_capacity(n),
        value: Vec::with_capacity(n),
        percentile90: Vec::with_capacity(n),
        median: Vec::with_capacity(n),
        percentile10: Vec::with_capacity(n),
        min: Vec::with_capacity(n),
        max: Vec::with_capacity(n),
        higher_than_max: Vec::with_capacity(n),
        lower_than_min: Vec::with_capacity(n),
    };

    for (date, value) in target.dates().iter().zip(target.values()) {
        let day = index_of
            .get(&(date.month(), date.day()))
            .map(|i| stats[*i])
            // A day-of-year the reference never saw (e.g. Feb 29 against a
            // leap-free reference) gets empty bands and false flags.
            .unwrap_or(DayStats {
                percentile90: f64::NAN,
                median: f64::NAN,
                percentile10: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            });

        result.date.push(date.format("%Y-%m-%d").to_string());
        result.value.push(*value);
        result.percentile90.push(day.percentile90);
        result.median.push(day.median);
        result.percentile10.push(day.percentile10);
        result.min.push(day.min);
        result.max.push(day.max);
        result.higher_than_max.push(*value > day.max);
        result.lower_than_min.push(*value < day.min);
    }

    result
}

/// Centered rolling mean over the day-of-year axis, wrapping across the
/// year boundary, skipping NaN entries.
fn smooth_wrapped(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = (SMOOTHING_WINDOW / 2) as isize;
    (0..n as isize)
        .map(|i| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for offset in -half..=half {
                let j = (i + offset).rem_euclid(n as isize) as usize;
                if values[j].is_finite() {
                    sum += values[j];
                    count += 1;
                }
            }
            if count > 0 {
                sum / count as f64
            } else {
                f64::NAN
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use climate_common::ValueKind;

    fn daily_series(years: std::ops::RangeInclusive<i32>, value: impl Fn(NaiveDate) -> f64) -> Series {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for year in years {
            let mut d = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            while d.year() == year {
                dates.push(d);
                values.push(value(d));
                d = d.succ_opt().unwrap();
            }
        }
        Series::new(dates, values, ValueKind::Plain)
    }

    #[test]
    fn test_band_ordering_invariant() {
        // Value varies by day-of-year and year, so each group has spread.
        let series = daily_series(1991..=1995, |d| {
            (d.ordinal() as f64 / 10.0).sin() * 5.0 + d.year() as f64 * 0.01
        });
        let cycle = compute(
            &series,
            &PeriodSpec::Years(1995, 1995),
            &PeriodSpec::Years(1991, 1994),
        );
        for i in 0..cycle.date.len() {
            assert!(cycle.percentile10[i] <= cycle.median[i] + 1e-9);
            assert!(cycle.median[i] <= cycle.percentile90[i] + 1e-9);
            assert!(cycle.min[i] <= cycle.percentile10[i] + 1e-9);
            assert!(cycle.percentile90[i] <= cycle.max[i] + 1e-9);
        }
    }

    #[test]
    fn test_constant_reference_survives_smoothing() {
        let series = daily_series(1991..=1993, |_| 4.0);
        let cycle = compute(
            &series,
            &PeriodSpec::Years(1993, 1993),
            &PeriodSpec::Years(1991, 1992),
        );
        assert!(cycle.median.iter().all(|v| (*v - 4.0).abs() < 1e-12));
        assert!(cycle.percentile90.iter().all(|v| (*v - 4.0).abs() < 1e-12));
        assert!(!cycle.higher_than_max.iter().any(|f| *f));
        assert!(!cycle.lower_than_min.iter().any(|f| *f));
    }

    #[test]
    fn test_exceedance_flags() {
        // Reference years are flat 10.0; the target year spikes once high
        // and once low.
        let series = daily_series(1991..=1993, |d| {
            if d.year() < 1993 {
                10.0
            } else if d.ordinal() == 100 {
                25.0
            } else if d.ordinal() == 200 {
                -5.0
            } else {
                10.0
            }
        });
        let cycle = compute(
            &series,
            &PeriodSpec::Years(1993, 1993),
            &PeriodSpec::Years(1991, 1992),
        );
        let higher: usize = cycle.higher_than_max.iter().filter(|f| **f).count();
        let lower: usize = cycle.lower_than_min.iter().filter(|f| **f).count();
        assert_eq!(higher, 1);
        assert_eq!(lower, 1);
    }

    #[test]
    fn test_smooth_wrapped_constant() {
        let values = vec![2.0; 10];
        assert!(smooth_wrapped(&values).iter().all(|v| (*v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_smooth_wrapped_crosses_seam() {
        // The first entry's window reaches the last entries.
        let mut values = vec![0.0; 6];
        values[5] = 6.0;
        let smoothed = smooth_wrapped(&values);
        assert!(smoothed[0] > 0.0);
        assert!(smoothed[2] == 0.0);
    }
}
