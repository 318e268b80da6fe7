//! Scan History Ring
//!
//! Provides a fixed-capacity ring of equal-width scans, stored row by row in
//! one flat buffer that grows until the ring is full.

mod buffer;
mod error;

pub use buffer::{ScanRing, DEFAULT_CAPACITY};
pub use error::RingError;
