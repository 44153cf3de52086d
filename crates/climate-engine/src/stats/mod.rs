//! The statistics engine: six computation routines over reduced series.
//!
//! Every routine consumes a normalized, time-indexed `Series` plus parsed
//! parameters and produces one typed result. They share the conventions of
//! the temporal framer (period selection, season wraparound, reference
//! periods) so the six products agree with each other.

pub mod annual_cycle;
pub mod climatology_map;
pub mod extreme_values;
pub mod histogram;
pub mod summary;
pub mod time_series;

/// Linear-interpolation percentile over finite samples.
///
/// `q` is in [0, 100]. Returns NaN when no finite sample exists.
pub(crate) fn percentile(values: &[f64], q: f64) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).expect("finite values"));

    let rank = q / 100.0 * (finite.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return finite[lower];
    }
    let fraction = rank - lower as f64;
    finite[lower] + (finite[upper] - finite[lower]) * fraction
}
