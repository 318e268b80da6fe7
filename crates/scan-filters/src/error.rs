//! Filter Error Types

use scan_ring::RingError;
use thiserror::Error;

/// Broad class of a [`FilterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong type for a parameter or a scan
    Type,
    /// Right type, logically invalid value
    Value,
    /// Configuration source could not be read
    Config,
}

/// Errors during filter construction and updates
#[derive(Debug, Error)]
pub enum FilterError {
    /// Parameter has the wrong type
    #[error("{param} must be of type {expected}, but given: {found}")]
    InvalidParameterType {
        param: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    /// Parameter has a logically invalid value
    #[error("{param} {reason}")]
    InvalidParameter {
        param: &'static str,
        reason: &'static str,
    },

    /// Scan is not a numeric sequence or rectangular array
    #[error("Invalid scan: {0}")]
    InvalidScan(String),

    /// Scan length differs from the first scan's length
    #[error("Number of data points not consistent: expected {expected}, got {actual}")]
    MeasurementCountMismatch { expected: usize, actual: usize },

    /// Configuration source failed to load
    #[error("Failed to load filter configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl FilterError {
    /// Get the error class
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidParameterType { .. } | Self::InvalidScan(_) => ErrorKind::Type,
            Self::InvalidParameter { .. } | Self::MeasurementCountMismatch { .. } => {
                ErrorKind::Value
            }
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<RingError> for FilterError {
    fn from(err: RingError) -> Self {
        match err {
            RingError::ZeroCapacity => Self::InvalidParameter {
                param: "capacity",
                reason: "must be greater than zero",
            },
            RingError::WidthMismatch { expected, actual } => {
                Self::MeasurementCountMismatch { expected, actual }
            }
        }
    }
}
