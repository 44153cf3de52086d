//! Climatology map: one aggregate per region over the filtered period.

use climate_common::{AggFunc, PeriodSpec, SeasonFilter};

use crate::results::ClimatologyMap;
use crate::series::Series;

/// Aggregate each region's series over the period and season; anomaly mode
/// subtracts the same aggregate computed over the reference period.
pub fn compute(
    regions: &[(String, Series)],
    period: &PeriodSpec,
    season: &SeasonFilter,
    func: AggFunc,
    reference: Option<&PeriodSpec>,
) -> ClimatologyMap {
    let mut ids = Vec::with_capacity(regions.len());
    let mut values = Vec::with_capacity(regions.len());

    for (id, series) in regions {
        let mut value = func.apply(series.select(period, season).values());
        if let Some(reference) = reference {
            value -= func.apply(series.select(reference, season).values());
        }
        ids.push(id.clone());
        values.push(value);
    }

    ClimatologyMap {
        region: ids,
        value: values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use climate_common::ValueKind;

    fn yearly_series(values: &[(i32, f64)]) -> Series {
        let dates = values
            .iter()
            .map(|(y, _)| NaiveDate::from_ymd_opt(*y, 6, 15).unwrap())
            .collect();
        let vals = values.iter().map(|(_, v)| *v).collect();
        Series::new(dates, vals, ValueKind::Plain)
    }

    #[test]
    fn test_one_value_per_region() {
        let regions = vec![
            ("ES".to_string(), yearly_series(&[(2000, 1.0), (2001, 3.0)])),
            ("FR".to_string(), yearly_series(&[(2000, 5.0), (2001, 7.0)])),
        ];
        let result = compute(
            &regions,
            &PeriodSpec::All,
            &SeasonFilter::annual(),
            AggFunc::Mean,
            None,
        );
        assert_eq!(result.region, vec!["ES", "FR"]);
        assert_eq!(result.value, vec![2.0, 6.0]);
    }

    #[test]
    fn test_anomaly_per_region() {
        let regions = vec![(
            "ES".to_string(),
            yearly_series(&[(1990, 1.0), (1991, 1.0), (2020, 4.0)]),
        )];
        let result = compute(
            &regions,
            &PeriodSpec::Years(2020, 2020),
            &SeasonFilter::annual(),
            AggFunc::Mean,
            Some(&PeriodSpec::Years(1990, 1991)),
        );
        assert_eq!(result.value, vec![3.0]);
    }
}
