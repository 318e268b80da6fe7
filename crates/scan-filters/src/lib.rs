//! Scan Filters
//!
//! Range clamping and temporal median smoothing for range-sensor scans
//! (lidar, sonar). Every filter accepts any [`ScanSource`], flattens it to a
//! row-major `Vec<f64>` and returns a scan of the same length.

mod chain;
mod error;
mod median;
mod normalizer;
mod range;
mod settings;
mod temporal;

pub use chain::{FilterChain, ScanFilter};
pub use error::{ErrorKind, FilterError};
pub use median::median_of_sorted;
pub use normalizer::{ScanSource, ScanValue};
pub use range::{RangeFilter, RangeFilterConfig};
pub use settings::{FilterConfig, TemporalMedianConfig, ENV_PREFIX};
pub use temporal::{TemporalMedianFilter, DEFAULT_NUM_PREV_SCANS};
