//! Extreme values: the minimum and maximum observation of a selection.

use climate_common::{PeriodSpec, SeasonFilter};

use crate::results::ExtremeValues;
use crate::series::Series;

/// Find the minimum and maximum of the filtered selection.
///
/// Ties break toward the earliest timestamp. Returns `None` when the
/// selection has no finite sample; the caller reports that against the
/// offending request.
pub fn compute(
    series: &Series,
    period: &PeriodSpec,
    season: &SeasonFilter,
) -> Option<ExtremeValues> {
    let filtered = series.select(period, season);

    let mut min: Option<(usize, f64)> = None;
    let mut max: Option<(usize, f64)> = None;

    for (i, value) in filtered.values().iter().enumerate() {
        if !value.is_finite() {
            continue;
        }
        // Strict comparisons keep the earliest date on ties.
        if min.map(|(_, v)| *value < v).unwrap_or(true) {
            min = Some((i, *value));
        }
        if max.map(|(_, v)| *value > v).unwrap_or(true) {
            max = Some((i, *value));
        }
    }

    let (min_idx, value_min) = min?;
    let (max_idx, value_max) = max?;

    Some(ExtremeValues {
        date_min: filtered.dates()[min_idx].format("%Y-%m-%d").to_string(),
        value_min,
        date_max: filtered.dates()[max_idx].format("%Y-%m-%d").to_string(),
        value_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use climate_common::ValueKind;

    fn series(points: &[(i32, u32, u32, f64)]) -> Series {
        let dates = points
            .iter()
            .map(|(y, m, d, _)| NaiveDate::from_ymd_opt(*y, *m, *d).unwrap())
            .collect();
        let values = points.iter().map(|(_, _, _, v)| *v).collect();
        Series::new(dates, values, ValueKind::Plain)
    }

    #[test]
    fn test_min_max_with_season_filter() {
        let s = series(&[
            (2003, 5, 1, 30.0),
            (2003, 6, 10, 35.0),
            (2003, 8, 5, 41.2),
            (2003, 8, 20, 12.0),
            (2003, 9, 1, 45.0),
        ]);
        let result = compute(
            &s,
            &PeriodSpec::Years(2003, 2003),
            &SeasonFilter::parse("06-08").unwrap(),
        )
        .unwrap();
        // The September spike is outside the season.
        assert_eq!(result.date_max, "2003-08-05");
        assert_eq!(result.value_max, 41.2);
        assert_eq!(result.date_min, "2003-08-20");
        assert_eq!(result.value_min, 12.0);
    }

    #[test]
    fn test_ties_keep_earliest_date() {
        let s = series(&[
            (2020, 1, 1, 5.0),
            (2020, 1, 2, 5.0),
            (2020, 1, 3, 5.0),
        ]);
        let result = compute(&s, &PeriodSpec::All, &SeasonFilter::annual()).unwrap();
        assert_eq!(result.date_min, "2020-01-01");
        assert_eq!(result.date_max, "2020-01-01");
    }

    #[test]
    fn test_empty_selection_is_none() {
        let s = series(&[(2020, 1, 1, f64::NAN)]);
        assert!(compute(&s, &PeriodSpec::All, &SeasonFilter::annual()).is_none());
        assert!(compute(&s, &PeriodSpec::Years(1999, 1999), &SeasonFilter::annual()).is_none());
    }
}
