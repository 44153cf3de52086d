//! Histograms comparing a target period's distribution to a reference.
//!
//! Both periods are binned against one shared set of edges spanning the
//! union of their value ranges. Computing edges from the union, not per
//! period, is what makes the two count vectors comparable.

use chrono::NaiveDate;

use climate_common::{PeriodSpec, SeasonFilter};

use crate::results::Histogram;
use crate::series::Series;

/// Number of evenly spaced bins.
pub const BIN_COUNT: usize = 30;

/// Build shared-edge frequency histograms for the two periods, with each
/// period's modal bin center and an exemplar date from that bin.
pub fn compute(
    series: &Series,
    period: &PeriodSpec,
    reference: &PeriodSpec,
    season: &SeasonFilter,
) -> Histogram {
    let target = finite_samples(&series.select(period, season));
    let baseline = finite_samples(&series.select(reference, season));

    let range = value_range(target.iter().chain(baseline.iter()));
    let Some((lo, hi)) = range else {
        return Histogram {
            bins: Vec::new(),
            value_period: Vec::new(),
            value_reference: Vec::new(),
            mode_value_period: None,
            mode_date_period: None,
            mode_value_reference: None,
            mode_date_reference: None,
        };
    };

    let width = (hi - lo) / BIN_COUNT as f64;
    let centers: Vec<f64> = (0..BIN_COUNT)
        .map(|i| lo + (i as f64 + 0.5) * width)
        .collect();

    let (counts_period, mode_period) = bin(&target, lo, width);
    let (counts_reference, mode_reference) = bin(&baseline, lo, width);

    Histogram {
        bins: centers.clone(),
        value_period: counts_period,
        value_reference: counts_reference,
        mode_value_period: mode_period.map(|(bin, _)| centers[bin]),
        mode_date_period: mode_period.map(|(_, date)| date.format("%Y-%m-%d").to_string()),
        mode_value_reference: mode_reference.map(|(bin, _)| centers[bin]),
        mode_date_reference: mode_reference.map(|(_, date)| date.format("%Y-%m-%d").to_string()),
    }
}

fn finite_samples(series: &Series) -> Vec<(NaiveDate, f64)> {
    series
        .dates()
        .iter()
        .zip(series.values())
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| (*d, *v))
        .collect()
}

/// Union value range; a degenerate range is widened so every sample still
/// lands in a bin of non-zero width.
fn value_range<'a>(values: impl Iterator<Item = &'a (NaiveDate, f64)>) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for (_, v) in values {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if lo > hi {
        return None;
    }
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    Some((lo, hi))
}

/// Count samples per bin and track the modal bin with the earliest date
/// observed in it.
fn bin(samples: &[(NaiveDate, f64)], lo: f64, width: f64) -> (Vec<u64>, Option<(usize, NaiveDate)>) {
    let mut counts = vec![0u64; BIN_COUNT];
    let mut earliest: Vec<Option<NaiveDate>> = vec![None; BIN_COUNT];

    for (date, value) in samples {
        // The final edge is closed, as in the usual histogram convention.
        let idx = (((value - lo) / width) as usize).min(BIN_COUNT - 1);
        counts[idx] += 1;
        let slot = &mut earliest[idx];
        if slot.map(|d| *date < d).unwrap_or(true) {
            *slot = Some(*date);
        }
    }

    let mode = counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .max_by_key(|(i, c)| (**c, std::cmp::Reverse(*i)))
        .map(|(i, _)| i);

    (
        counts,
        mode.and_then(|i| earliest[i].map(|date| (i, date))),
    )
}
