//! Lazy Zarr-backed climate arrays.
//!
//! `ClimateArray::open` resolves a registry location to a chunked array
//! handle: local filesystem first, remote object store as the fallback.
//! Only chunk metadata and the (small) time coordinate are read eagerly;
//! data chunks are fetched on demand during materialization. Handles are
//! request-local — the registry underneath is the persistent cache point.

use chrono::{Duration, NaiveDate};
use tracing::{debug, instrument};
use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs_storage::ReadableStorageTraits;

use climate_common::{ClimateError, ClimateResult, DatasetKey, StorageLocation, ValueKind};
use climate_store::ObjectStorageConfig;

use crate::storage::{open_local_store, open_remote_store, DynStorage};

/// Timedelta encodings recognized on the variable's units attribute,
/// with their length in nanoseconds.
const TIMEDELTA_UNITS: &[(&str, f64)] = &[
    ("nanoseconds", 1.0),
    ("microseconds", 1e3),
    ("milliseconds", 1e6),
    ("seconds", 1e9),
    ("minutes", 60.0 * 1e9),
    ("hours", 3_600.0 * 1e9),
    ("days", 86_400.0 * 1e9),
];

/// A lazy, chunked, time-indexed array for one variable.
pub struct ClimateArray {
    array: Array<dyn ReadableStorageTraits>,
    times: Vec<NaiveDate>,
    units: String,
    kind: ValueKind,
    /// Factor applied to raw values on read: timedelta-to-nanoseconds for
    /// duration arrays, m/s-to-km/h for wind, 1.0 otherwise.
    scale: f64,
    ny: usize,
    nx: usize,
}

impl ClimateArray {
    /// Open the array for `key` at `location`, local storage first.
    #[instrument(skip_all, fields(key = %key))]
    pub fn open(
        location: &StorageLocation,
        key: &DatasetKey,
        remote_config: Option<&ObjectStorageConfig>,
    ) -> ClimateResult<Self> {
        let mut local_failure = None;

        if let Some(path) = &location.local {
            match open_local_store(path).and_then(|store| Self::open_at(store, "", key)) {
                Ok(array) => {
                    debug!(path = %path.display(), "Opened local dataset");
                    return Ok(array);
                }
                Err(e) => local_failure = Some(e.to_string()),
            }
        }

        if let Some(uri) = &location.remote {
            if let Some(config) = remote_config {
                let prefix = StorageLocation::parse_remote_uri(uri)
                    .map(|(_, prefix)| format!("/{}", prefix))
                    .ok_or_else(|| {
                        ClimateError::storage(format!("malformed remote URI: {}", uri))
                    })?;
                match open_remote_store(config)
                    .and_then(|store| Self::open_at(store, &prefix, key))
                {
                    Ok(array) => {
                        debug!(uri = %uri, "Opened remote dataset");
                        return Ok(array);
                    }
                    Err(e) => {
                        return Err(ClimateError::storage(format!(
                            "local: {}; remote {}: {}",
                            local_failure.unwrap_or_else(|| "not configured".to_string()),
                            uri,
                            e
                        )))
                    }
                }
            }
        }

        Err(ClimateError::storage(format!(
            "no storage path succeeded for {}: local: {}",
            key,
            local_failure.unwrap_or_else(|| "not configured".to_string()),
        )))
    }

    fn open_at(storage: DynStorage, prefix: &str, key: &DatasetKey) -> ClimateResult<Self> {
        let var_path = format!("{}/{}", prefix, key.variable);
        let array = Array::open(storage.clone(), &var_path)
            .map_err(|e| ClimateError::storage(format!("open {}: {}", var_path, e)))?;

        let shape = array.shape().to_vec();
        if shape.len() != 3 {
            return Err(ClimateError::storage(format!(
                "{} is not a (time, y, x) array (shape {:?})",
                var_path, shape
            )));
        }

        let units = array
            .attributes()
            .get("units")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let (kind, mut scale, mut units) = classify(array.data_type(), &units)?;

        // Wind speeds are served in km/h; the stored arrays are m/s.
        if key.variable == "sfcWind" && kind == ValueKind::Plain {
            scale *= 3.6;
            units = "km/h".to_string();
        }

        let time_path = format!("{}/time", prefix);
        let times = decode_time_axis(storage, &time_path)?;
        if times.len() as u64 != shape[0] {
            return Err(ClimateError::storage(format!(
                "time axis length {} does not match array shape {:?}",
                times.len(),
                shape
            )));
        }

        Ok(Self {
            array,
            times,
            units,
            kind,
            scale,
            ny: shape[1] as usize,
            nx: shape[2] as usize,
        })
    }

    /// Decoded time axis, one date per step.
    pub fn times(&self) -> &[NaiveDate] {
        &self.times
    }

    /// Units string after load-time conversions.
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Whether values are plain numerics or duration counts.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Spatial grid shape (rows, columns).
    pub fn grid(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Fetch a contiguous run of time steps as f64, row-major per step.
    ///
    /// Missing samples come back as NaN regardless of the on-disk encoding.
    pub fn read_block(&self, start: usize, len: usize) -> ClimateResult<Vec<f64>> {
        let subset = ArraySubset::new_with_start_shape(
            vec![start as u64, 0, 0],
            vec![len as u64, self.ny as u64, self.nx as u64],
        )
        .map_err(|e| ClimateError::storage(e.to_string()))?;

        let values = match self.array.data_type() {
            DataType::Float64 => self
                .array
                .retrieve_array_subset_elements::<f64>(&subset)
                .map_err(|e| ClimateError::storage(e.to_string()))?,
            DataType::Float32 => self
                .array
                .retrieve_array_subset_elements::<f32>(&subset)
                .map_err(|e| ClimateError::storage(e.to_string()))?
                .into_iter()
                .map(f64::from)
                .collect(),
            DataType::Int64 => self
                .array
                .retrieve_array_subset_elements::<i64>(&subset)
                .map_err(|e| ClimateError::storage(e.to_string()))?
                .into_iter()
                // i64::MIN is NaT in timedelta encodings.
                .map(|v| if v == i64::MIN { f64::NAN } else { v as f64 })
                .collect(),
            other => {
                return Err(ClimateError::TypeConversionError(format!(
                    "unsupported data type {:?}",
                    other
                )))
            }
        };

        Ok(values
            .into_iter()
            .map(|v| if v.is_finite() { v * self.scale } else { f64::NAN })
            .collect())
    }
}

/// Decide how raw values map to floats for a given data type and units.
fn classify(data_type: &DataType, units: &str) -> ClimateResult<(ValueKind, f64, String)> {
    match data_type {
        DataType::Float32 | DataType::Float64 => {
            Ok((ValueKind::Plain, 1.0, units.to_string()))
        }
        DataType::Int64 => {
            for (name, nanos) in TIMEDELTA_UNITS {
                if units == *name {
                    return Ok((ValueKind::Duration, *nanos, "days".to_string()));
                }
            }
            Ok((ValueKind::Plain, 1.0, units.to_string()))
        }
        other => Err(ClimateError::TypeConversionError(format!(
            "unsupported data type {:?}",
            other
        ))),
    }
}

/// Read and decode a CF-style time coordinate ("days since 1940-01-01").
fn decode_time_axis(storage: DynStorage, path: &str) -> ClimateResult<Vec<NaiveDate>> {
    let array = Array::open(storage, path)
        .map_err(|e| ClimateError::storage(format!("open {}: {}", path, e)))?;

    let shape = array.shape().to_vec();
    if shape.len() != 1 {
        return Err(ClimateError::storage(format!(
            "time coordinate must be 1-D, got {:?}",
            shape
        )));
    }

    let units = array
        .attributes()
        .get("units")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let (unit, origin) = parse_time_units(&units)?;

    let subset = ArraySubset::new_with_start_shape(vec![0], vec![shape[0]])
        .map_err(|e| ClimateError::storage(e.to_string()))?;

    let offsets: Vec<f64> = match array.data_type() {
        DataType::Float64 => array
            .retrieve_array_subset_elements::<f64>(&subset)
            .map_err(|e| ClimateError::storage(e.to_string()))?,
        DataType::Float32 => array
            .retrieve_array_subset_elements::<f32>(&subset)
            .map_err(|e| ClimateError::storage(e.to_string()))?
            .into_iter()
            .map(f64::from)
            .collect(),
        DataType::Int64 => array
            .retrieve_array_subset_elements::<i64>(&subset)
            .map_err(|e| ClimateError::storage(e.to_string()))?
            .into_iter()
            .map(|v| v as f64)
            .collect(),
        other => {
            return Err(ClimateError::TypeConversionError(format!(
                "unsupported time coordinate type {:?}",
                other
            )))
        }
    };

    let origin = origin.and_hms_opt(0, 0, 0).expect("midnight exists");
    Ok(offsets
        .into_iter()
        .map(|offset| {
            let seconds = (offset * unit.seconds()) as i64;
            (origin + Duration::seconds(seconds)).date()
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Days,
    Hours,
    Seconds,
}

impl TimeUnit {
    fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

fn parse_time_units(units: &str) -> ClimateResult<(TimeUnit, NaiveDate)> {
    let (unit, origin) = units.split_once(" since ").ok_or_else(|| {
        ClimateError::storage(format!("unrecognized time units: '{}'", units))
    })?;

    let unit = match unit.trim() {
        "days" | "day" => TimeUnit::Days,
        "hours" | "hour" => TimeUnit::Hours,
        "seconds" | "second" => TimeUnit::Seconds,
        other => {
            return Err(ClimateError::storage(format!(
                "unrecognized time unit: '{}'",
                other
            )))
        }
    };

    // Origin may carry a clock part ("1940-01-01 00:00:00"); the date
    // prefix is all the daily axis needs.
    let date_part = origin.trim().get(..10).unwrap_or(origin.trim());
    let origin = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| {
        ClimateError::storage(format!("unrecognized time origin '{}': {}", origin, e))
    })?;

    Ok((unit, origin))
}
