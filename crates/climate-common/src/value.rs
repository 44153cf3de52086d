//! Tagged value kinds and the type normalizer.
//!
//! Day-count indices ("frost days" and friends) are stored as timedelta
//! encodings; carried internally as nanosecond counts. Without an explicit
//! conversion they would serialize as nanosecond-scale integers, silently
//! corrupting day counts, and spatial averaging already turns integer counts
//! into non-integer floats that must stay floats. The kind tag travels with
//! every reduced series so the conversion is type-directed, not inferred
//! from variable names.

use serde::{Deserialize, Serialize};

/// Nanoseconds in one day.
pub const NANOS_PER_DAY: f64 = 86_400.0 * 1e9;

/// Whether a series carries plain numeric values or duration-as-count
/// values awaiting conversion to float days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Plain numeric values; normalization is the identity.
    Plain,
    /// Duration values, carried as nanosecond counts.
    Duration,
}

/// Convert one value to plain floating point.
///
/// `Duration` values become day counts; `Plain` values pass through
/// unchanged, so normalizing an already-normalized value is idempotent.
/// NaN is preserved as the missing-data marker.
pub fn normalize(value: f64, kind: ValueKind) -> f64 {
    match kind {
        ValueKind::Plain => value,
        ValueKind::Duration => value / NANOS_PER_DAY,
    }
}
