//! Temporal framing: time-axis selection and season-anchored yearly
//! aggregation.
//!
//! Selection is a pair of independent predicates (year in period, month in
//! season). Seasonal-yearly aggregation is anchored instead: the season of
//! year Y starts in Y-1 when it wraps the year boundary, and its aggregate
//! is labeled with the year the season ends.

use chrono::{Datelike, NaiveDate};

use climate_common::{AggFunc, PeriodSpec, SeasonFilter};

use crate::series::Series;

/// Indices of a time axis selected by a period and a season filter.
#[derive(Debug, Clone)]
pub struct TimeSelection {
    indices: Vec<usize>,
}

impl TimeSelection {
    /// Select timestamps whose year falls in `period` (every timestamp for
    /// "all") and whose month passes `season`.
    pub fn new(times: &[NaiveDate], period: &PeriodSpec, season: &SeasonFilter) -> Self {
        let indices = times
            .iter()
            .enumerate()
            .filter(|(_, date)| {
                period.contains_year(date.year()) && season.contains_month(date.month())
            })
            .map(|(i, _)| i)
            .collect();
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Contiguous (start, len) runs of selected indices.
    ///
    /// Materialization fetches one storage subset per run, so consecutive
    /// timestamps cost one read.
    pub fn runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut iter = self.indices.iter().copied();
        let Some(first) = iter.next() else {
            return runs;
        };
        let mut start = first;
        let mut len = 1;
        for idx in iter {
            if idx == start + len {
                len += 1;
            } else {
                runs.push((start, len));
                start = idx;
                len = 1;
            }
        }
        runs.push((start, len));
        runs
    }
}

/// Widest period a request must materialize to serve both the target and
/// the reference selection, widened one year back when the season wraps
/// (the anchored window of the first year starts in the prior December).
pub fn materialization_period(
    period: &PeriodSpec,
    reference: Option<&PeriodSpec>,
    season: &SeasonFilter,
) -> PeriodSpec {
    let mut envelope = match reference {
        Some(reference) => period.envelope(reference),
        None => *period,
    };
    if season.is_wraparound() {
        if let PeriodSpec::Years(start, end) = envelope {
            envelope = PeriodSpec::Years(start - 1, end);
        }
    }
    envelope
}

/// One aggregate per year of the period, over that year's season window.
///
/// A wraparound season's window for year Y runs from the start month of
/// Y-1 through the end month of Y; the aggregate is labeled Y-01-01. Years
/// without samples yield no point.
pub fn seasonal_yearly(
    series: &Series,
    period: &PeriodSpec,
    season: &SeasonFilter,
    func: AggFunc,
) -> Series {
    let Some((first_year, last_year)) = period.year_bounds(series.dates()) else {
        return Series::new(Vec::new(), Vec::new(), series.kind());
    };

    let mut dates = Vec::new();
    let mut values = Vec::new();

    for year in first_year..=last_year {
        let start_year = if season.is_wraparound() { year - 1 } else { year };
        let Some(window_start) = NaiveDate::from_ymd_opt(start_year, season.start, 1) else {
            continue;
        };
        let Some(window_end) = last_day_of_month(year, season.end) else {
            continue;
        };

        let lo = series.dates().partition_point(|d| *d < window_start);
        let hi = series.dates().partition_point(|d| *d <= window_end);
        if lo == hi {
            continue;
        }

        let aggregate = func.apply(&series.values()[lo..hi]);
        dates.push(NaiveDate::from_ymd_opt(year, 1, 1).expect("january first"));
        values.push(aggregate);
    }

    Series::new(dates, values, series.kind())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_common::ValueKind;

    fn daily_dates(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut d = from;
        while d <= to {
            dates.push(d);
            d = d.succ_opt().unwrap();
        }
        dates
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ones(dates: Vec<NaiveDate>) -> Series {
        let n = dates.len();
        Series::new(dates, vec![1.0; n], ValueKind::Plain)
    }

    #[test]
    fn test_selection_year_and_season() {
        // Jan(31) + Feb(28) + Mar(31) of 2001 = 90 days.
        let times = daily_dates(ymd(2000, 1, 1), ymd(2002, 12, 31));
        let selection = TimeSelection::new(
            &times,
            &PeriodSpec::Years(2001, 2001),
            &SeasonFilter::parse("01-03").unwrap(),
        );
        assert_eq!(selection.len(), 90);
        for &i in selection.indices() {
            assert_eq!(times[i].year(), 2001);
            assert!((1..=3).contains(&times[i].month()));
        }
    }

    #[test]
    fn test_selection_all_period() {
        // Jan 2000 + Jan 2001 = 62 days.
        let times = daily_dates(ymd(2000, 1, 1), ymd(2001, 12, 31));
        let selection = TimeSelection::new(
            &times,
            &PeriodSpec::All,
            &SeasonFilter::parse("01-01").unwrap(),
        );
        assert_eq!(selection.len(), 62);
    }

    #[test]
    fn test_selection_wraparound_months() {
        // One full year of monthly stamps: DJF keeps exactly Dec, Jan, Feb.
        let times: Vec<NaiveDate> = (1..=12).map(|m| ymd(2020, m, 15)).collect();
        let selection = TimeSelection::new(
            &times,
            &PeriodSpec::All,
            &SeasonFilter::parse("12-02").unwrap(),
        );
        let months: Vec<u32> = selection.indices().iter().map(|&i| times[i].month()).collect();
        assert_eq!(months, vec![1, 2, 12]);
    }

    #[test]
    fn test_runs_group_contiguous_indices() {
        let times = daily_dates(ymd(2020, 1, 1), ymd(2020, 12, 31));
        let selection = TimeSelection::new(
            &times,
            &PeriodSpec::All,
            &SeasonFilter::parse("12-02").unwrap(),
        );
        // Jan-Feb is one run, December another.
        assert_eq!(selection.runs().len(), 2);
        let total: usize = selection.runs().iter().map(|(_, len)| len).sum();
        assert_eq!(total, selection.len());
    }

    #[test]
    fn test_seasonal_yearly_wraparound_window() {
        // DJF of 2001 covers Dec 2000 through Feb 2001: 31 + 31 + 28 days.
        let series = ones(daily_dates(ymd(2000, 1, 1), ymd(2002, 12, 31)));
        let yearly = seasonal_yearly(
            &series,
            &PeriodSpec::Years(2001, 2001),
            &SeasonFilter::parse("12-02").unwrap(),
            AggFunc::Sum,
        );
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly.dates()[0], ymd(2001, 1, 1));
        assert_eq!(yearly.values()[0], 90.0);
    }

    #[test]
    fn test_seasonal_yearly_annual_sum() {
        // Constant ones summed over full years: leap year 366, others 365.
        let series = ones(daily_dates(ymd(2000, 1, 1), ymd(2002, 12, 31)));
        let yearly = seasonal_yearly(
            &series,
            &PeriodSpec::Years(2000, 2002),
            &SeasonFilter::annual(),
            AggFunc::Sum,
        );
        assert_eq!(yearly.values(), &[366.0, 365.0, 365.0]);
    }

    #[test]
    fn test_seasonal_yearly_skips_empty_years() {
        let series = ones(daily_dates(ymd(2001, 1, 1), ymd(2001, 12, 31)));
        let yearly = seasonal_yearly(
            &series,
            &PeriodSpec::Years(2000, 2002),
            &SeasonFilter::annual(),
            AggFunc::Mean,
        );
        assert_eq!(yearly.len(), 1);
        assert_eq!(yearly.dates()[0], ymd(2001, 1, 1));
    }

    #[test]
    fn test_materialization_period_widens_for_wraparound() {
        let period = PeriodSpec::Years(2001, 2001);
        let widened =
            materialization_period(&period, None, &SeasonFilter::parse("12-02").unwrap());
        assert_eq!(widened, PeriodSpec::Years(2000, 2001));

        let plain = materialization_period(&period, None, &SeasonFilter::annual());
        assert_eq!(plain, PeriodSpec::Years(2001, 2001));
    }
}
