//! Filter Settings
//!
//! Parameters arrive either as typed Rust values or as loosely typed
//! documents (TOML/JSON files, environment). Loosely typed parameters are
//! type-checked here: booleans are never accepted as numbers, and window
//! sizes must be integers.

use crate::chain::FilterChain;
use crate::error::FilterError;
use crate::normalizer::json_type_name;
use crate::range::{RangeFilter, RangeFilterConfig};
use crate::temporal::{TemporalMedianFilter, DEFAULT_NUM_PREV_SCANS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable prefix for overrides, e.g.
/// `SCAN_FILTER_TEMPORAL__NUM_PREV_SCANS=5`
pub const ENV_PREFIX: &str = "SCAN_FILTER";

/// Temporal median window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalMedianConfig {
    /// Previous scans kept alongside the current one
    pub num_prev_scans: usize,
}

impl Default for TemporalMedianConfig {
    fn default() -> Self {
        Self {
            num_prev_scans: DEFAULT_NUM_PREV_SCANS,
        }
    }
}

impl TemporalMedianConfig {
    /// Read from a document such as `{"num_prev_scans": 3}`
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let table = table("temporal", value)?;
        let mut config = Self::default();
        if let Some(v) = table.get("num_prev_scans") {
            config.num_prev_scans = count_param("num_prev_scans", v)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the window, including the current scan, fits in `usize`
    pub fn validate(&self) -> Result<(), FilterError> {
        match self.num_prev_scans.checked_add(1) {
            Some(_) => Ok(()),
            None => Err(FilterError::InvalidParameter {
                param: "num_prev_scans",
                reason: "is too large",
            }),
        }
    }

    /// Build a filter with this window
    pub fn build(&self) -> Result<TemporalMedianFilter, FilterError> {
        TemporalMedianFilter::new(self.num_prev_scans)
    }
}

impl RangeFilterConfig {
    /// Read from a document such as `{"min_range": 0.1, "max_range": 12}`
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let table = table("range", value)?;
        let mut config = Self::default();
        if let Some(v) = table.get("min_range") {
            config.min_range = real_param("min_range", v)?;
        }
        if let Some(v) = table.get("max_range") {
            config.max_range = real_param("max_range", v)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Build a filter with these bounds
    pub fn build(&self) -> Result<RangeFilter, FilterError> {
        RangeFilter::from_config(*self)
    }
}

/// Full filter pipeline configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Range clamp bounds
    pub range: RangeFilterConfig,
    /// Temporal median window
    pub temporal: TemporalMedianConfig,
}

impl FilterConfig {
    /// Read from a document with optional `range` and `temporal` tables
    pub fn from_value(value: &Value) -> Result<Self, FilterError> {
        let root = table("config", value)?;
        let mut config = Self::default();
        if let Some(range) = root.get("range") {
            config.range = RangeFilterConfig::from_value(range)?;
        }
        if let Some(temporal) = root.get("temporal") {
            config.temporal = TemporalMedianConfig::from_value(temporal)?;
        }
        debug!("Parsed filter configuration: {:?}", config);
        Ok(config)
    }

    /// Load from a file, with environment overrides prefixed by [`ENV_PREFIX`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FilterError> {
        let path = path.as_ref();
        info!("Loading filter configuration from {}", path.display());
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment())
            .build()?;
        Self::from_settings(settings)
    }

    /// Parse a TOML document, with environment overrides prefixed by [`ENV_PREFIX`]
    pub fn from_toml_str(source: &str) -> Result<Self, FilterError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .add_source(environment())
            .build()?;
        Self::from_settings(settings)
    }

    /// Build the range clamp followed by the temporal median
    pub fn build_chain(&self) -> Result<FilterChain, FilterError> {
        Ok(FilterChain::new()
            .with(self.range.build()?)
            .with(self.temporal.build()?))
    }

    fn from_settings(settings: config::Config) -> Result<Self, FilterError> {
        let value: Value = settings.try_deserialize()?;
        Self::from_value(&value)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn table<'a>(param: &'static str, value: &'a Value) -> Result<&'a Map<String, Value>, FilterError> {
    value
        .as_object()
        .ok_or_else(|| FilterError::InvalidParameterType {
            param,
            expected: "table",
            found: json_type_name(value),
        })
}

/// Real-valued parameter: ints and floats, never booleans
fn real_param(param: &'static str, value: &Value) -> Result<f64, FilterError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(FilterError::InvalidParameterType {
            param,
            expected: "int or float",
            found: "number",
        }),
        other => Err(FilterError::InvalidParameterType {
            param,
            expected: "int or float",
            found: json_type_name(other),
        }),
    }
}

/// Count parameter: non-negative integers only
fn count_param(param: &'static str, value: &Value) -> Result<usize, FilterError> {
    match value {
        Value::Number(n) if n.is_u64() => {
            let count = n.as_u64().unwrap_or_default();
            usize::try_from(count).map_err(|_| FilterError::InvalidParameter {
                param,
                reason: "is too large",
            })
        }
        Value::Number(n) if n.is_i64() => Err(FilterError::InvalidParameter {
            param,
            reason: "must be greater than or equal to zero",
        }),
        other => Err(FilterError::InvalidParameterType {
            param,
            expected: "int",
            found: json_type_name(other),
        }),
    }
}
