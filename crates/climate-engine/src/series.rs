//! In-memory reduced series.
//!
//! A `Series` is what spatial reduction produces: one value per selected
//! time step, tagged with the value kind so the normalizer can be applied
//! type-directed. All transforms return new series; nothing is mutated in
//! place.

use chrono::{Datelike, NaiveDate};

use climate_common::{normalize, AggFunc, PeriodSpec, ResampleFreq, SeasonFilter, ValueKind};

/// A time-indexed series of scalar values.
#[derive(Debug, Clone)]
pub struct Series {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
    kind: ValueKind,
}

impl Series {
    /// Build a series; dates and values must be parallel and chronological.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>, kind: ValueKind) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values, kind }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Convert every value to plain floating point.
    ///
    /// Duration series become day counts and the kind flips to `Plain`, so
    /// normalizing twice is the same as normalizing once.
    pub fn normalize(self) -> Series {
        match self.kind {
            ValueKind::Plain => self,
            ValueKind::Duration => Series {
                values: self
                    .values
                    .iter()
                    .map(|v| normalize(*v, ValueKind::Duration))
                    .collect(),
                dates: self.dates,
                kind: ValueKind::Plain,
            },
        }
    }

    /// Restrict to samples whose year is in the period and whose month
    /// passes the season filter.
    pub fn select(&self, period: &PeriodSpec, season: &SeasonFilter) -> Series {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        for (date, value) in self.dates.iter().zip(&self.values) {
            if period.contains_year(date.year()) && season.contains_month(date.month()) {
                dates.push(*date);
                values.push(*value);
            }
        }
        Series::new(dates, values, self.kind)
    }

    /// NaN-skipping mean of all values.
    pub fn mean(&self) -> f64 {
        AggFunc::Mean.apply(&self.values)
    }

    /// Resample to the given frequency with the given aggregation.
    ///
    /// Group labels follow period starts: the first of the month for
    /// monthly, January 1st for annual. Daily resampling aggregates
    /// duplicate dates.
    pub fn resample(&self, freq: ResampleFreq, func: AggFunc) -> Series {
        let mut dates = Vec::new();
        let mut values = Vec::new();
        let mut bucket: Vec<f64> = Vec::new();
        let mut current: Option<NaiveDate> = None;

        for (date, value) in self.dates.iter().zip(&self.values) {
            let label = match freq {
                ResampleFreq::Daily => *date,
                ResampleFreq::Monthly => {
                    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month")
                }
                ResampleFreq::Annual => {
                    NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("january first")
                }
            };
            if current != Some(label) {
                if let Some(prev) = current {
                    dates.push(prev);
                    values.push(func.apply(&bucket));
                    bucket.clear();
                }
                current = Some(label);
            }
            bucket.push(*value);
        }
        if let Some(prev) = current {
            dates.push(prev);
            values.push(func.apply(&bucket));
        }

        Series::new(dates, values, self.kind)
    }

    /// Subtract a constant from every value (anomaly shift).
    pub fn offset(&self, delta: f64) -> Series {
        Series::new(
            self.dates.clone(),
            self.values.iter().map(|v| v - delta).collect(),
            self.kind,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_common::NANOS_PER_DAY;

    fn daily_series(start: (i32, u32, u32), values: Vec<f64>) -> Series {
        let first = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        let dates = (0..values.len())
            .map(|i| first + chrono::Duration::days(i as i64))
            .collect();
        Series::new(dates, values, ValueKind::Plain)
    }

    #[test]
    fn test_normalize_duration_series() {
        let dates = vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()];
        let series = Series::new(dates, vec![5.0 * NANOS_PER_DAY], ValueKind::Duration);
        let normalized = series.normalize();
        assert_eq!(normalized.values(), &[5.0]);
        assert_eq!(normalized.kind(), ValueKind::Plain);

        // Idempotent once plain.
        let again = normalized.clone().normalize();
        assert_eq!(again.values(), normalized.values());
    }

    #[test]
    fn test_select_by_year_and_month() {
        let series = daily_series((2019, 12, 30), (0..40).map(|v| v as f64).collect());
        let period = PeriodSpec::Years(2020, 2020);
        let season = SeasonFilter::parse("01-01").unwrap();
        let selected = series.select(&period, &season);
        assert_eq!(selected.len(), 31);
        assert!(selected.dates().iter().all(|d| d.year() == 2020 && d.month() == 1));
    }

    #[test]
    fn test_resample_monthly_mean() {
        // Jan has 31 days of 1.0, Feb 29 days (2020 is a leap year) of 3.0.
        let mut values = vec![1.0; 31];
        values.extend(vec![3.0; 29]);
        let series = daily_series((2020, 1, 1), values);
        let monthly = series.resample(ResampleFreq::Monthly, AggFunc::Mean);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly.dates()[0], NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(monthly.dates()[1], NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_eq!(monthly.values(), &[1.0, 3.0]);
    }

    #[test]
    fn test_resample_annual_sum() {
        let series = daily_series((2020, 12, 30), vec![1.0, 1.0, 1.0, 1.0]);
        let annual = series.resample(ResampleFreq::Annual, AggFunc::Sum);
        assert_eq!(annual.len(), 2);
        assert_eq!(annual.values(), &[2.0, 2.0]);
    }

    #[test]
    fn test_offset() {
        let series = daily_series((2020, 1, 1), vec![3.0, 4.0]);
        assert_eq!(series.offset(1.5).values(), &[1.5, 2.5]);
    }
}
