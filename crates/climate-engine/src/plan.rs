//! Deferred query plans over climate arrays.
//!
//! A `QueryPlan` records what a request needs — the time selection and one
//! or more region reductions — without touching chunk data. `materialize`
//! is the single evaluation point per request: it walks the selected time
//! steps in contiguous runs, fetches each run's subset once, and collapses
//! the spatial dimensions into one weighted-mean series per region. Chunk
//! fetches have no side effects, so an abandoned request leaves nothing
//! behind.

use std::sync::Arc;

use tracing::debug;

use climate_common::{ClimateError, ClimateResult};
use climate_store::RegionMask;

use crate::framer::TimeSelection;
use crate::loader::ClimateArray;
use crate::series::Series;

/// A recorded selection + reduction, evaluated once.
pub struct QueryPlan<'a> {
    array: &'a ClimateArray,
    selection: TimeSelection,
    regions: Vec<Arc<RegionMask>>,
}

impl<'a> QueryPlan<'a> {
    /// Start a plan from an array and a time selection.
    pub fn new(array: &'a ClimateArray, selection: TimeSelection) -> Self {
        Self {
            array,
            selection,
            regions: Vec::new(),
        }
    }

    /// Add a region reduction. Multi-region plans share each fetched run.
    pub fn reduce(mut self, mask: Arc<RegionMask>) -> Self {
        self.regions.push(mask);
        self
    }

    /// Evaluate the plan: one series per region, in the order added.
    pub fn materialize(self) -> ClimateResult<Vec<Series>> {
        let (ny, nx) = self.array.grid();

        for mask in &self.regions {
            if mask.ny != ny || mask.nx != nx {
                return Err(ClimateError::TypeConversionError(format!(
                    "region '{}' mask grid {}x{} does not match array grid {}x{}",
                    mask.id, mask.ny, mask.nx, ny, nx
                )));
            }
        }

        let times = self.array.times();
        let step = ny * nx;
        let n_selected = self.selection.len();

        let mut dates = Vec::with_capacity(n_selected);
        let mut values: Vec<Vec<f64>> = self
            .regions
            .iter()
            .map(|_| Vec::with_capacity(n_selected))
            .collect();

        let runs = self.selection.runs();
        debug!(
            steps = n_selected,
            runs = runs.len(),
            regions = self.regions.len(),
            "Materializing query plan"
        );

        for (start, len) in runs {
            let block = self.array.read_block(start, len)?;
            for t in 0..len {
                dates.push(times[start + t]);
                let frame = &block[t * step..(t + 1) * step];
                for (region_idx, mask) in self.regions.iter().enumerate() {
                    values[region_idx].push(weighted_mean(frame, mask, nx));
                }
            }
        }

        Ok(values
            .into_iter()
            .map(|series| Series::new(dates.clone(), series, self.array.kind()))
            .collect())
    }
}

/// Weighted mean over the mask's cells, excluding missing grid points.
///
/// Missing cells drop out of both the numerator and the weight sum; they
/// are never counted as zero. A step with no valid cell is NaN.
fn weighted_mean(frame: &[f64], mask: &RegionMask, nx: usize) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for cell in &mask.cells {
        let value = frame[cell.row * nx + cell.col];
        if value.is_finite() {
            weighted_sum += cell.weight * value;
            weight_total += cell.weight;
        }
    }
    if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        f64::NAN
    }
}
