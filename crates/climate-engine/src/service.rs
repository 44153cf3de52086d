//! High-level climate data service.
//!
//! The `ClimateDataService` provides a unified interface the API layer
//! calls with pre-validated parameters. It sequences a request end to end:
//! registry resolution, lazy array loading, temporal selection, spatial
//! reduction, one materialization, normalization, then the requested
//! statistics routine.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use climate_common::{
    AggFunc, ClimateError, ClimateResult, DatasetKey, PeriodSpec, ResampleFreq, SeasonFilter,
};
use climate_store::{DatasetRegistry, RegionCatalog, RegionMask};

use crate::config::EngineConfig;
use crate::framer::{materialization_period, TimeSelection};
use crate::loader::ClimateArray;
use crate::params::{
    AnnualCycleParams, ClimatologyMapParams, ExtremeValuesParams, HistogramParams,
    SummaryStatsParams, TimeSeriesParams,
};
use crate::plan::QueryPlan;
use crate::results::{
    AnnualCycle, ClimatologyMap, ExtremeValues, Histogram, SummaryStats, TimeSeries,
    VariableSummary,
};
use crate::series::Series;
use crate::stats;

/// The primary interface for computing statistical products.
pub struct ClimateDataService {
    config: EngineConfig,
    registry: DatasetRegistry,
    regions: RegionCatalog,
}

impl ClimateDataService {
    /// Create a service from engine configuration.
    ///
    /// Typically constructed once at application startup; the registry and
    /// region catalog it owns are the process-wide caches.
    pub fn new(config: EngineConfig) -> Self {
        let registry = DatasetRegistry::new(
            config.input_data_dir.clone(),
            config.object_storage.clone(),
        );
        let regions = RegionCatalog::new(config.regions_dir.clone());
        Self {
            config,
            registry,
            regions,
        }
    }

    /// The dataset registry (for admin refresh endpoints).
    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// The region catalog (for admin refresh endpoints).
    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    /// Time series of resampled values, optionally as anomalies.
    #[instrument(skip(self, params), fields(variable = %params.variable, region = %params.region_name))]
    pub async fn time_series(&self, params: &TimeSeriesParams) -> ClimateResult<TimeSeries> {
        let period = PeriodSpec::parse(&params.period)?;
        let season = SeasonFilter::parse(&params.season_filter)?;
        let freq = ResampleFreq::parse(&params.resample_freq)?;
        let func = AggFunc::parse(&params.resample_func)?;
        let reference = self.reference_for_anomaly(params.anomaly, &params.reference_period)?;

        let array = self
            .open_array(&params.variable, &params.dataset, &params.region_set)
            .await?;
        let envelope = materialization_period(&period, reference.as_ref(), &season);
        let series = self
            .reduced_series(&array, &params.region_set, &params.region_name, &envelope, &season)
            .await?;

        let result = stats::time_series::compute(
            &series,
            &period,
            &season,
            freq,
            func,
            reference.as_ref(),
        );
        info!(points = result.date.len(), "Time series computed");
        Ok(result)
    }

    /// One aggregate per region of the set (or a requested subset).
    #[instrument(skip(self, params), fields(variable = %params.variable, region_set = %params.region_set))]
    pub async fn climatology_map(
        &self,
        params: &ClimatologyMapParams,
    ) -> ClimateResult<ClimatologyMap> {
        let period = PeriodSpec::parse(&params.period)?;
        let season = SeasonFilter::parse(&params.season_filter)?;
        let func = AggFunc::parse(&params.season_filter_func)?;
        let reference = self.reference_for_anomaly(params.anomaly, &params.reference_period)?;

        let set = self.regions.region_set(&params.region_set).await?;
        let ids: Vec<String> = if params.region_name.trim().is_empty() {
            set.region_ids()
        } else {
            params
                .region_name
                .split(';')
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect()
        };

        let array = self
            .open_array(&params.variable, &params.dataset, &params.region_set)
            .await?;
        let envelope = materialization_period(&period, reference.as_ref(), &season);
        let selection = TimeSelection::new(array.times(), &envelope, &season);

        let mut plan = QueryPlan::new(&array, selection);
        for id in &ids {
            let mask = set.mask(id).ok_or_else(|| ClimateError::RegionNotFound {
                region: id.clone(),
                region_set: params.region_set.clone(),
            })?;
            plan = plan.reduce(mask);
        }

        let regions: Vec<(String, Series)> = ids
            .into_iter()
            .zip(plan.materialize()?)
            .map(|(id, series)| (id, series.normalize()))
            .collect();

        let result =
            stats::climatology_map::compute(&regions, &period, &season, func, reference.as_ref());
        info!(regions = result.region.len(), "Climatology map computed");
        Ok(result)
    }

    /// Daily values of the target period against reference bands.
    #[instrument(skip(self, params), fields(variable = %params.variable, region = %params.region_name))]
    pub async fn annual_cycle(&self, params: &AnnualCycleParams) -> ClimateResult<AnnualCycle> {
        let period = PeriodSpec::parse(&params.period)?;
        let reference = PeriodSpec::parse(&params.reference_period)?;
        let season = SeasonFilter::annual();

        let array = self
            .open_array(&params.variable, &params.dataset, &params.region_set)
            .await?;
        let envelope = period.envelope(&reference);
        let series = self
            .reduced_series(&array, &params.region_set, &params.region_name, &envelope, &season)
            .await?;

        let result = stats::annual_cycle::compute(&series, &period, &reference);
        info!(points = result.date.len(), "Annual cycle computed");
        Ok(result)
    }

    /// Minimum and maximum observation of the filtered selection.
    #[instrument(skip(self, params), fields(variable = %params.variable, region = %params.region_name))]
    pub async fn extreme_values(
        &self,
        params: &ExtremeValuesParams,
    ) -> ClimateResult<ExtremeValues> {
        let period = PeriodSpec::parse(&params.period)?;
        let season = SeasonFilter::parse(&params.season_filter)?;

        let array = self
            .open_array(&params.variable, &params.dataset, &params.region_set)
            .await?;
        let series = self
            .reduced_series(&array, &params.region_set, &params.region_name, &period, &season)
            .await?;

        stats::extreme_values::compute(&series, &period, &season).ok_or_else(|| {
            ClimateError::invalid_period(&params.period, "selection contains no finite samples")
        })
    }

    /// Shared-edge histograms of the target and reference periods.
    #[instrument(skip(self, params), fields(variable = %params.variable, region = %params.region_name))]
    pub async fn histogram(&self, params: &HistogramParams) -> ClimateResult<Histogram> {
        let period = PeriodSpec::parse(&params.period)?;
        let reference = PeriodSpec::parse(&params.reference_period)?;
        let season = SeasonFilter::parse(&params.season_filter)?;

        let array = self
            .open_array(&params.variable, &params.dataset, &params.region_set)
            .await?;
        let envelope = materialization_period(&period, Some(&reference), &season);
        let series = self
            .reduced_series(&array, &params.region_set, &params.region_name, &envelope, &season)
            .await?;

        Ok(stats::histogram::compute(&series, &period, &reference, &season))
    }

    /// Multi-period summaries for one or more variables.
    #[instrument(skip(self, params), fields(region = %params.region_name))]
    pub async fn summary_stats(&self, params: &SummaryStatsParams) -> ClimateResult<SummaryStats> {
        let period = PeriodSpec::parse(&params.period)?;
        let season = SeasonFilter::parse(&params.season_filter)?;
        let func = AggFunc::parse(&params.season_filter_func)?;

        let variables = params.variables();
        if variables.is_empty() {
            return Err(ClimateError::DatasetNotFound(format!(
                "no variables requested for {}/{}",
                params.dataset, params.region_set
            )));
        }

        let mut result = SummaryStats {
            stats: Default::default(),
        };

        for variable in &variables {
            let array = match self
                .open_array(variable, &params.dataset, &params.region_set)
                .await
            {
                Ok(array) => array,
                // One missing variable does not sink a multi-variable
                // summary; a fully empty one does (below).
                Err(ClimateError::DatasetNotFound(key)) => {
                    warn!(key = %key, "Skipping unavailable variable");
                    continue;
                }
                Err(e) => return Err(e),
            };

            // The trend wants the full record and the anchored seasonal
            // windows want the year before a wraparound season's start.
            let series = self
                .reduced_series(
                    &array,
                    &params.region_set,
                    &params.region_name,
                    &PeriodSpec::All,
                    &season,
                )
                .await?;
            let yearly = crate::framer::seasonal_yearly(&series, &PeriodSpec::All, &season, func);

            let summary: VariableSummary =
                stats::summary::compute(&yearly, &period, array.units());
            result.stats.insert((*variable).to_string(), summary);
        }

        if result.stats.is_empty() {
            return Err(ClimateError::DatasetNotFound(format!(
                "no variables available for {}/{}",
                params.dataset, params.region_set
            )));
        }

        info!(variables = result.stats.len(), "Summary stats computed");
        Ok(result)
    }

    fn reference_for_anomaly(
        &self,
        anomaly: bool,
        reference_period: &Option<String>,
    ) -> ClimateResult<Option<PeriodSpec>> {
        match (anomaly, reference_period) {
            (true, Some(reference)) => Ok(Some(PeriodSpec::parse(reference)?)),
            (true, None) => Err(ClimateError::invalid_period(
                "",
                "anomaly requested without a reference_period",
            )),
            (false, _) => Ok(None),
        }
    }

    async fn open_array(
        &self,
        variable: &str,
        dataset: &str,
        region_set: &str,
    ) -> ClimateResult<ClimateArray> {
        let key = DatasetKey::from_request(variable, dataset, region_set);
        let location = self.registry.resolve(&key).await?;
        ClimateArray::open(&location, &key, self.config.object_storage.as_ref())
    }

    async fn reduced_series(
        &self,
        array: &ClimateArray,
        region_set: &str,
        region: &str,
        period: &PeriodSpec,
        season: &SeasonFilter,
    ) -> ClimateResult<Series> {
        let mask: Arc<RegionMask> = self.regions.region(region_set, region).await?;
        let selection = TimeSelection::new(array.times(), period, season);
        let mut reduced = QueryPlan::new(array, selection).reduce(mask).materialize()?;
        Ok(reduced.remove(0).normalize())
    }
}
