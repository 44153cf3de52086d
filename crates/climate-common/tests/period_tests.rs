//! Comprehensive tests for period and season parsing.

use climate_common::{ClimateError, PeriodSpec, SeasonFilter};

// ============================================================================
// PeriodSpec parsing
// ============================================================================

#[test]
fn test_parse_all_token() {
    assert_eq!(PeriodSpec::parse("all").unwrap(), PeriodSpec::All);
    assert_eq!(PeriodSpec::parse(" all ").unwrap(), PeriodSpec::All);
}

#[test]
fn test_parse_range() {
    assert_eq!(
        PeriodSpec::parse("1961-1990").unwrap(),
        PeriodSpec::Years(1961, 1990)
    );
}

#[test]
fn test_parse_single_year_range() {
    assert_eq!(
        PeriodSpec::parse("2024-2024").unwrap(),
        PeriodSpec::Years(2024, 2024)
    );
}

#[test]
fn test_parse_non_numeric_year() {
    let err = PeriodSpec::parse("19x1-1990").unwrap_err();
    assert!(matches!(err, ClimateError::InvalidPeriodFormat { .. }));
    assert!(err.to_string().contains("19x1-1990"));
}

#[test]
fn test_parse_missing_separator() {
    assert!(PeriodSpec::parse("1990").is_err());
    assert!(PeriodSpec::parse("").is_err());
}

#[test]
fn test_parse_reversed_range_rejected() {
    // Wraparound is defined for seasons only; a reversed year range is
    // always malformed, never guessed as wraparound intent.
    let err = PeriodSpec::parse("2020-2003").unwrap_err();
    assert!(matches!(err, ClimateError::InvalidPeriodFormat { .. }));
}

// ============================================================================
// PeriodSpec membership
// ============================================================================

#[test]
fn test_contains_year_inclusive_bounds() {
    let p = PeriodSpec::Years(1991, 2020);
    assert!(p.contains_year(1991));
    assert!(p.contains_year(2020));
    assert!(!p.contains_year(1990));
    assert!(!p.contains_year(2021));
}

#[test]
fn test_all_contains_everything() {
    assert!(PeriodSpec::All.contains_year(1800));
    assert!(PeriodSpec::All.contains_year(2100));
}

#[test]
fn test_envelope_union() {
    let a = PeriodSpec::Years(2000, 2005);
    let b = PeriodSpec::Years(1961, 1990);
    assert_eq!(a.envelope(&b), PeriodSpec::Years(1961, 2005));
    assert_eq!(a.envelope(&PeriodSpec::All), PeriodSpec::All);
}

// ============================================================================
// SeasonFilter
// ============================================================================

#[test]
fn test_season_annual_default() {
    let annual = SeasonFilter::default();
    assert_eq!(annual, SeasonFilter::annual());
    for month in 1..=12 {
        assert!(annual.contains_month(month));
    }
}

#[test]
fn test_season_single_month() {
    let jan = SeasonFilter::parse("01-01").unwrap();
    assert!(jan.contains_month(1));
    assert!(!jan.contains_month(2));
}

#[test]
fn test_season_wraparound_djf() {
    let djf = SeasonFilter::parse("12-02").unwrap();
    let selected: Vec<u32> = (1..=12).filter(|m| djf.contains_month(*m)).collect();
    assert_eq!(selected, vec![1, 2, 12]);
}

#[test]
fn test_season_invalid_months() {
    assert!(SeasonFilter::parse("0-5").is_err());
    assert!(SeasonFilter::parse("1-13").is_err());
    assert!(SeasonFilter::parse("ab-cd").is_err());
    assert!(SeasonFilter::parse("06").is_err());
}
