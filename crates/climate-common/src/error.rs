//! Error types for climate-stats services.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type ClimateResult<T> = Result<T, ClimateError>;

/// Primary error type for climate query operations.
///
/// Every kind is a point-of-failure report: none is retried internally and
/// partial results are never returned alongside one.
#[derive(Debug, Error)]
pub enum ClimateError {
    /// No registry entry matches the key, even after a refresh.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The region id is absent from the resolved region set.
    #[error("region '{region}' not found in region set '{region_set}'")]
    RegionNotFound { region: String, region_set: String },

    /// A period or season string could not be parsed.
    #[error("invalid period format '{input}': {message}")]
    InvalidPeriodFormat { input: String, message: String },

    /// Both the local and the remote load attempt failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A value could not be normalized to floating point.
    #[error("type conversion failed: {0}")]
    TypeConversionError(String),
}

impl ClimateError {
    /// Create an InvalidPeriodFormat error carrying the offending input.
    pub fn invalid_period(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPeriodFormat {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a StorageUnavailable error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Get the HTTP status code for this error (used by the API layer).
    pub fn http_status_code(&self) -> u16 {
        match self {
            ClimateError::InvalidPeriodFormat { .. } => 400,
            ClimateError::DatasetNotFound(_) | ClimateError::RegionNotFound { .. } => 404,
            ClimateError::StorageUnavailable(_) => 503,
            ClimateError::TypeConversionError(_) => 500,
        }
    }
}

impl From<std::io::Error> for ClimateError {
    fn from(err: std::io::Error) -> Self {
        ClimateError::StorageUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ClimateError::DatasetNotFound("x".into()).http_status_code(), 404);
        assert_eq!(
            ClimateError::invalid_period("202x-2020", "bad year").http_status_code(),
            400
        );
        assert_eq!(ClimateError::storage("down").http_status_code(), 503);
    }

    #[test]
    fn test_invalid_period_carries_input() {
        let err = ClimateError::invalid_period("2030-2020", "end before start");
        assert!(err.to_string().contains("2030-2020"));
        assert!(err.to_string().contains("end before start"));
    }
}
