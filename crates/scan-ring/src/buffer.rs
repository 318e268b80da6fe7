//! Fixed-Capacity Scan Ring Implementation

use crate::error::RingError;

/// Default ring capacity (3 previous scans plus the current one)
pub const DEFAULT_CAPACITY: usize = 4;

/// Ring of equal-width scans stored row by row in one flat buffer.
///
/// The row width is fixed by the first push. Storage grows one row per push
/// until the ring is full; after that, pushing overwrites the oldest row in
/// place and nothing is allocated.
#[derive(Debug, Clone)]
pub struct ScanRing {
    /// Row-major storage, at most `capacity * width` values
    storage: Vec<f64>,
    /// Maximum number of rows held
    capacity: usize,
    /// Row width, set by the first push
    width: Option<usize>,
    /// Slot the next row is written to
    head: usize,
    /// Number of rows currently held
    len: usize,
    /// Total rows accepted since creation or the last clear
    total_written: usize,
}

impl ScanRing {
    /// Create an empty ring holding at most `capacity` rows
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(Self::empty(capacity))
    }

    /// Create a ring with the default capacity
    pub fn with_default_capacity() -> Self {
        Self::empty(DEFAULT_CAPACITY)
    }

    fn empty(capacity: usize) -> Self {
        Self {
            storage: Vec::new(),
            capacity,
            width: None,
            head: 0,
            len: 0,
            total_written: 0,
        }
    }

    /// Push a row, overwriting the oldest one when full.
    ///
    /// Returns `true` if a row was evicted. A row whose width disagrees with
    /// the established width is rejected and the ring is left untouched.
    pub fn push(&mut self, row: &[f64]) -> Result<bool, RingError> {
        let width = match self.width {
            Some(width) if width != row.len() => {
                return Err(RingError::WidthMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            Some(width) => width,
            None => {
                self.width = Some(row.len());
                row.len()
            }
        };

        let evicted = self.is_full();
        if evicted {
            let start = self.head * width;
            self.storage[start..start + width].copy_from_slice(row);
        } else {
            // Not yet full: head == len, so the slot is the end of storage
            self.storage.extend_from_slice(row);
            self.len += 1;
        }

        self.head = if self.head + 1 == self.capacity {
            0
        } else {
            self.head + 1
        };
        self.total_written += 1;

        Ok(evicted)
    }

    /// Get the number of rows currently held
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the ring holds no rows
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if the next push will evict the oldest row
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Get the ring capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the row width, if a row has been pushed
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Get a row by age, `0` being the most recent
    pub fn row(&self, age: usize) -> Option<&[f64]> {
        if age >= self.len {
            return None;
        }
        let width = self.width.unwrap_or(0);
        let slot = if self.head > age {
            self.head - age - 1
        } else {
            self.capacity - (age + 1 - self.head)
        };
        let start = slot * width;
        self.storage.get(start..start + width)
    }

    /// Iterate over rows, most recent first
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.len).filter_map(move |age| self.row(age))
    }

    /// Iterate over the values at one position across all held rows
    pub fn column(&self, position: usize) -> impl Iterator<Item = f64> + '_ {
        self.rows().filter_map(move |row| row.get(position).copied())
    }

    /// Get total rows accepted (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Drop all rows and forget the row width
    pub fn clear(&mut self) {
        self.storage.clear();
        self.width = None;
        self.head = 0;
        self.len = 0;
        self.total_written = 0;
    }
}

impl Default for ScanRing {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}
