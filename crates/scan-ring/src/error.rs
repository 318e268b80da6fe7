//! Ring Error Types

use thiserror::Error;

/// Errors raised by [`crate::ScanRing`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingError {
    /// Ring cannot hold any rows
    #[error("Ring capacity must be greater than zero")]
    ZeroCapacity,

    /// Row width differs from the width fixed by the first row
    #[error("Row width mismatch: expected {expected}, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
}
