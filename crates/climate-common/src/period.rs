//! Period and season parsing for temporal selection.
//!
//! Periods are either the literal `all` or a closed year range `YYYY-YYYY`.
//! Seasons are month ranges `MM-MM`; a start month greater than the end
//! month denotes a wraparound season crossing the year boundary ("12-02" is
//! Dec through Feb). Wraparound is defined for seasons only — a year range
//! with end < start is always an error.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ClimateError, ClimateResult};

/// A parsed period specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodSpec {
    /// Every available timestamp.
    All,
    /// Years in the closed interval [start, end].
    Years(i32, i32),
}

impl PeriodSpec {
    /// Parse `"all"` or `"YYYY-YYYY"`.
    pub fn parse(input: &str) -> ClimateResult<Self> {
        let trimmed = input.trim();
        if trimmed == "all" {
            return Ok(PeriodSpec::All);
        }
        let (start, end) = trimmed
            .split_once('-')
            .ok_or_else(|| ClimateError::invalid_period(input, "expected 'all' or 'YYYY-YYYY'"))?;
        let start: i32 = start
            .parse()
            .map_err(|_| ClimateError::invalid_period(input, "non-numeric start year"))?;
        let end: i32 = end
            .parse()
            .map_err(|_| ClimateError::invalid_period(input, "non-numeric end year"))?;
        if end < start {
            return Err(ClimateError::invalid_period(input, "end year before start year"));
        }
        Ok(PeriodSpec::Years(start, end))
    }

    /// Whether a year falls inside this period.
    pub fn contains_year(&self, year: i32) -> bool {
        match *self {
            PeriodSpec::All => true,
            PeriodSpec::Years(start, end) => (start..=end).contains(&year),
        }
    }

    /// Concrete year bounds, falling back to the data's span for `All`.
    ///
    /// Returns `None` when `All` is paired with an empty time axis.
    pub fn year_bounds(&self, times: &[NaiveDate]) -> Option<(i32, i32)> {
        match *self {
            PeriodSpec::Years(start, end) => Some((start, end)),
            PeriodSpec::All => {
                let first = times.first()?.year();
                let last = times.last()?.year();
                Some((first, last))
            }
        }
    }

    /// Widen this period to cover another (union envelope).
    pub fn envelope(&self, other: &PeriodSpec) -> PeriodSpec {
        match (*self, *other) {
            (PeriodSpec::Years(a0, a1), PeriodSpec::Years(b0, b1)) => {
                PeriodSpec::Years(a0.min(b0), a1.max(b1))
            }
            _ => PeriodSpec::All,
        }
    }
}

/// A parsed season filter over months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonFilter {
    /// First month of the season (1-12).
    pub start: u32,
    /// Last month of the season (1-12).
    pub end: u32,
}

impl SeasonFilter {
    /// The full year, "01-12".
    pub fn annual() -> Self {
        Self { start: 1, end: 12 }
    }

    /// Parse `"MM-MM"` with both months in 1-12.
    pub fn parse(input: &str) -> ClimateResult<Self> {
        let (start, end) = input
            .trim()
            .split_once('-')
            .ok_or_else(|| ClimateError::invalid_period(input, "expected 'MM-MM'"))?;
        let start: u32 = start
            .parse()
            .map_err(|_| ClimateError::invalid_period(input, "non-numeric start month"))?;
        let end: u32 = end
            .parse()
            .map_err(|_| ClimateError::invalid_period(input, "non-numeric end month"))?;
        if !(1..=12).contains(&start) || !(1..=12).contains(&end) {
            return Err(ClimateError::invalid_period(input, "months must be in 01-12"));
        }
        Ok(Self { start, end })
    }

    /// Whether the season crosses the year boundary.
    pub fn is_wraparound(&self) -> bool {
        self.start > self.end
    }

    /// Whether a month (1-12) falls inside the season.
    pub fn contains_month(&self, month: u32) -> bool {
        if self.is_wraparound() {
            month >= self.start || month <= self.end
        } else {
            (self.start..=self.end).contains(&month)
        }
    }
}

impl Default for SeasonFilter {
    fn default() -> Self {
        Self::annual()
    }
}
