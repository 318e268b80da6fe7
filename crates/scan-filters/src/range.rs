//! Range Clamp Filter

use crate::chain::ScanFilter;
use crate::error::FilterError;
use crate::normalizer::ScanSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Range clamp bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFilterConfig {
    /// Measurements below this are raised to it
    pub min_range: f64,
    /// Measurements above this are lowered to it
    pub max_range: f64,
}

impl Default for RangeFilterConfig {
    fn default() -> Self {
        Self {
            min_range: 0.03,
            max_range: 50.0,
        }
    }
}

impl RangeFilterConfig {
    /// Check that both bounds are non-negative and ordered
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.min_range.is_nan() {
            return Err(FilterError::InvalidParameter {
                param: "min_range",
                reason: "must be a number",
            });
        }
        if self.max_range.is_nan() {
            return Err(FilterError::InvalidParameter {
                param: "max_range",
                reason: "must be a number",
            });
        }
        if self.min_range < 0.0 {
            Err(FilterError::InvalidParameter {
                param: "min_range",
                reason: "must be greater than or equal to zero",
            })
        } else if self.max_range < 0.0 {
            Err(FilterError::InvalidParameter {
                param: "max_range",
                reason: "must be greater than or equal to zero",
            })
        } else if self.max_range < self.min_range {
            Err(FilterError::InvalidParameter {
                param: "max_range",
                reason: "must be greater than or equal to min_range",
            })
        } else {
            Ok(())
        }
    }
}

/// Clamps every measurement of a scan into `[min_range, max_range]`
#[derive(Debug, Clone)]
pub struct RangeFilter {
    config: RangeFilterConfig,
}

impl RangeFilter {
    /// Create a new range filter with validated bounds
    pub fn new(min_range: f64, max_range: f64) -> Result<Self, FilterError> {
        Self::from_config(RangeFilterConfig {
            min_range,
            max_range,
        })
    }

    /// Create a range filter from a config
    pub fn from_config(config: RangeFilterConfig) -> Result<Self, FilterError> {
        config.validate()?;
        debug!(
            "Creating range filter: min_range={}, max_range={}",
            config.min_range, config.max_range
        );
        Ok(Self { config })
    }

    /// Get the lower bound
    pub fn min_range(&self) -> f64 {
        self.config.min_range
    }

    /// Get the upper bound
    pub fn max_range(&self) -> f64 {
        self.config.max_range
    }

    /// Get the current bounds
    pub fn config(&self) -> RangeFilterConfig {
        self.config
    }

    /// Replace both bounds. The filter is unchanged on error.
    pub fn set_config(&mut self, config: RangeFilterConfig) -> Result<(), FilterError> {
        config.validate()?;
        debug!(
            "Range filter bounds changed: [{}, {}] -> [{}, {}]",
            self.config.min_range, self.config.max_range, config.min_range, config.max_range
        );
        self.config = config;
        Ok(())
    }

    /// Replace both bounds. The filter is unchanged on error.
    pub fn set_bounds(&mut self, min_range: f64, max_range: f64) -> Result<(), FilterError> {
        self.set_config(RangeFilterConfig {
            min_range,
            max_range,
        })
    }

    /// Replace the lower bound, revalidating against the current upper bound
    pub fn set_min_range(&mut self, min_range: f64) -> Result<(), FilterError> {
        self.set_bounds(min_range, self.config.max_range)
    }

    /// Replace the upper bound, revalidating against the current lower bound
    pub fn set_max_range(&mut self, max_range: f64) -> Result<(), FilterError> {
        self.set_bounds(self.config.min_range, max_range)
    }

    /// Clamp a scan. Values equal to a bound pass unchanged.
    pub fn update<S: ScanSource + ?Sized>(&self, scan: &S) -> Result<Vec<f64>, FilterError> {
        let mut values = scan.to_scan()?;
        self.clamp_in_place(&mut values);
        Ok(values)
    }

    fn clamp_in_place(&self, values: &mut [f64]) {
        let RangeFilterConfig {
            min_range,
            max_range,
        } = self.config;
        for value in values.iter_mut() {
            if *value < min_range {
                *value = min_range;
            } else if *value > max_range {
                *value = max_range;
            }
        }
    }
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self {
            config: RangeFilterConfig::default(),
        }
    }
}

impl ScanFilter for RangeFilter {
    fn apply(&mut self, scan: &[f64]) -> Result<Vec<f64>, FilterError> {
        let mut values = scan.to_vec();
        self.clamp_in_place(&mut values);
        Ok(values)
    }

    fn name(&self) -> &'static str {
        "range"
    }
}
