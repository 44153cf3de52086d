//! Region catalog: named mask/weight definitions per region set.
//!
//! Region sets are supplied as JSON files, one per set, named
//! `{region_set}.json` inside the configured regions directory. Each file
//! carries the grid shape the masks are aligned to and, per region, a
//! sparse list of `[row, col, weight]` cells. Regions within a set are
//! disjoint by convention; this is not enforced.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use climate_common::{ClimateError, ClimateResult};

/// One weighted grid cell of a region mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskCell {
    pub row: usize,
    pub col: usize,
    pub weight: f64,
}

/// A named region's mask, aligned to the dataset grid.
#[derive(Debug, Clone)]
pub struct RegionMask {
    /// Region identifier (e.g. "ES").
    pub id: String,
    /// Grid rows the mask is aligned to.
    pub ny: usize,
    /// Grid columns the mask is aligned to.
    pub nx: usize,
    /// Non-zero cells of the mask.
    pub cells: Vec<MaskCell>,
}

/// A named collection of regions sharing one grid.
#[derive(Debug, Clone)]
pub struct RegionSet {
    pub name: String,
    pub ny: usize,
    pub nx: usize,
    masks: HashMap<String, Arc<RegionMask>>,
}

impl RegionSet {
    /// Look up one region's mask.
    pub fn mask(&self, region: &str) -> Option<Arc<RegionMask>> {
        self.masks.get(region).cloned()
    }

    /// Region ids in this set, sorted for deterministic iteration.
    pub fn region_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.masks.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RegionSetFile {
    grid: GridShapeFile,
    regions: HashMap<String, RegionCellsFile>,
}

#[derive(Debug, Deserialize)]
struct GridShapeFile {
    ny: usize,
    nx: usize,
}

#[derive(Debug, Deserialize)]
struct RegionCellsFile {
    cells: Vec<(usize, usize, f64)>,
}

/// Process-scoped cache of loaded region sets.
///
/// Read-mostly; a set is loaded once under the write lock (single-writer
/// discipline) and shared until an explicit `refresh`.
pub struct RegionCatalog {
    dir: PathBuf,
    sets: RwLock<HashMap<String, Arc<RegionSet>>>,
}

impl RegionCatalog {
    /// Create a catalog over a directory of region-set files.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sets: RwLock::new(HashMap::new()),
        }
    }

    /// Get one region's mask, loading the set on first access.
    pub async fn region(&self, region_set: &str, region: &str) -> ClimateResult<Arc<RegionMask>> {
        let set = self.region_set(region_set).await?;
        set.mask(region).ok_or_else(|| ClimateError::RegionNotFound {
            region: region.to_string(),
            region_set: region_set.to_string(),
        })
    }

    /// Get a whole region set, loading it on first access.
    pub async fn region_set(&self, region_set: &str) -> ClimateResult<Arc<RegionSet>> {
        if let Some(set) = self.sets.read().await.get(region_set) {
            return Ok(Arc::clone(set));
        }

        let mut sets = self.sets.write().await;
        // Another loader may have won the write lock first.
        if let Some(set) = sets.get(region_set) {
            return Ok(Arc::clone(set));
        }

        let set = Arc::new(self.load_set(region_set)?);
        sets.insert(region_set.to_string(), Arc::clone(&set));
        Ok(set)
    }

    /// Drop all cached sets; they reload on next access.
    pub async fn refresh(&self) {
        self.sets.write().await.clear();
    }

    fn load_set(&self, region_set: &str) -> ClimateResult<RegionSet> {
        let path = self.dir.join(format!("{}.json", region_set));
        let raw = std::fs::read_to_string(&path).map_err(|_| ClimateError::RegionNotFound {
            region: "*".to_string(),
            region_set: region_set.to_string(),
        })?;

        let file: RegionSetFile = serde_json::from_str(&raw).map_err(|e| {
            warn!(region_set = %region_set, error = %e, "Unparseable region set definition");
            ClimateError::RegionNotFound {
                region: "*".to_string(),
                region_set: region_set.to_string(),
            }
        })?;

        let (ny, nx) = (file.grid.ny, file.grid.nx);
        let mut masks = HashMap::new();

        for (id, region) in file.regions {
            let mut cells = Vec::with_capacity(region.cells.len());
            for (row, col, weight) in region.cells {
                if row >= ny || col >= nx {
                    warn!(
                        region = %id,
                        row,
                        col,
                        "Dropping mask cell outside the grid"
                    );
                    continue;
                }
                if weight <= 0.0 || !weight.is_finite() {
                    continue;
                }
                cells.push(MaskCell { row, col, weight });
            }
            masks.insert(
                id.clone(),
                Arc::new(RegionMask {
                    id,
                    ny,
                    nx,
                    cells,
                }),
            );
        }

        info!(
            region_set = %region_set,
            regions = masks.len(),
            "Loaded region set"
        );

        Ok(RegionSet {
            name: region_set.to_string(),
            ny,
            nx,
            masks,
        })
    }
}
