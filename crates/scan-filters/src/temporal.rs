//! Temporal Median Filter
//!
//! Smooths each measurement position across the current scan and up to
//! `num_prev_scans` previous scans. The first scan fixes the measurement
//! count; later scans of a different length are rejected without touching
//! the history.

use crate::chain::ScanFilter;
use crate::error::FilterError;
use crate::median::median_in_place;
use crate::normalizer::ScanSource;
use scan_ring::ScanRing;
use tracing::{debug, trace, warn};

/// Default number of previous scans kept in the window
pub const DEFAULT_NUM_PREV_SCANS: usize = 3;

/// Per-position median over a sliding window of scans
#[derive(Debug, Clone)]
pub struct TemporalMedianFilter {
    /// Previous scans kept alongside the current one
    num_prev_scans: usize,
    /// Window of accepted scans, capacity `num_prev_scans + 1`
    history: ScanRing,
    /// Reused column buffer for sorting
    scratch: Vec<f64>,
}

impl TemporalMedianFilter {
    /// Create a new filter keeping `num_prev_scans` previous scans.
    ///
    /// A window of zero makes the filter an identity. Nothing is reserved
    /// up front; the history grows one scan at a time until the window is
    /// full.
    pub fn new(num_prev_scans: usize) -> Result<Self, FilterError> {
        let capacity = num_prev_scans
            .checked_add(1)
            .ok_or(FilterError::InvalidParameter {
                param: "num_prev_scans",
                reason: "is too large",
            })?;
        debug!("Creating temporal median filter: num_prev_scans={}", num_prev_scans);
        Ok(Self {
            num_prev_scans,
            history: ScanRing::new(capacity)?,
            scratch: Vec::new(),
        })
    }

    /// Create a filter from a signed window size, rejecting negatives
    pub fn try_new(num_prev_scans: i64) -> Result<Self, FilterError> {
        let num_prev_scans =
            usize::try_from(num_prev_scans).map_err(|_| FilterError::InvalidParameter {
                param: "num_prev_scans",
                reason: "must be greater than or equal to zero",
            })?;
        Self::new(num_prev_scans)
    }

    /// Get the number of previous scans kept
    pub fn num_prev_scans(&self) -> usize {
        self.num_prev_scans
    }

    /// Get the measurement count fixed by the first scan
    pub fn measurement_count(&self) -> Option<usize> {
        self.history.width()
    }

    /// Get the number of scans currently in the window
    pub fn window_len(&self) -> usize {
        self.history.len()
    }

    /// Get the number of scans accepted since creation or the last reset
    pub fn accepted_scans(&self) -> usize {
        self.history.total_written()
    }

    /// Check if a first scan has been received
    pub fn is_primed(&self) -> bool {
        !self.history.is_empty()
    }

    /// Add a scan and return the per-position median of the window.
    ///
    /// The first scan is returned unchanged. A scan whose length differs
    /// from the first scan's fails with
    /// [`FilterError::MeasurementCountMismatch`] and leaves the window as it
    /// was.
    pub fn update<S: ScanSource + ?Sized>(&mut self, scan: &S) -> Result<Vec<f64>, FilterError> {
        let values = scan.to_scan()?;
        self.ingest(values)
    }

    /// Forget all scans and the measurement count
    pub fn reset(&mut self) {
        debug!("Resetting temporal median filter");
        self.history.clear();
        self.scratch.clear();
    }

    /// Check a scan length against the measurement count, if one is fixed
    fn check_measurement_count(&self, len: usize) -> Result<(), FilterError> {
        match self.history.width() {
            Some(expected) if expected != len => {
                warn!("Rejecting scan: {} measurements, expected {}", len, expected);
                Err(FilterError::MeasurementCountMismatch {
                    expected,
                    actual: len,
                })
            }
            _ => Ok(()),
        }
    }

    fn ingest(&mut self, values: Vec<f64>) -> Result<Vec<f64>, FilterError> {
        let Some(measurement_count) = self.history.width() else {
            debug!("First scan received: measurement_count={}", values.len());
            self.history.push(&values)?;
            return Ok(values);
        };

        self.check_measurement_count(values.len())?;

        if self.history.push(&values)? {
            trace!("Window full, evicted oldest scan");
        }

        Ok(self.column_medians(measurement_count))
    }

    fn column_medians(&mut self, measurement_count: usize) -> Vec<f64> {
        let mut medians = Vec::with_capacity(measurement_count);
        for position in 0..measurement_count {
            self.scratch.clear();
            self.scratch.extend(self.history.column(position));
            if let Some(median) = median_in_place(&mut self.scratch) {
                medians.push(median);
            }
        }
        medians
    }
}

impl Default for TemporalMedianFilter {
    fn default() -> Self {
        // DEFAULT_CAPACITY is DEFAULT_NUM_PREV_SCANS + 1
        Self {
            num_prev_scans: DEFAULT_NUM_PREV_SCANS,
            history: ScanRing::with_default_capacity(),
            scratch: Vec::new(),
        }
    }
}

impl ScanFilter for TemporalMedianFilter {
    fn apply(&mut self, scan: &[f64]) -> Result<Vec<f64>, FilterError> {
        self.ingest(scan.to_vec())
    }

    fn check_len(&self, len: usize) -> Result<(), FilterError> {
        self.check_measurement_count(len)
    }

    fn reset(&mut self) {
        TemporalMedianFilter::reset(self);
    }

    fn name(&self) -> &'static str {
        "temporal_median"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::arr2;

    fn scans() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 1.0, 2.0, 1.0, 3.0],
            vec![1.0, 5.0, 7.0, 1.0, 3.0],
            vec![2.0, 3.0, 4.0, 1.0, 0.0],
            vec![3.0, 3.0, 3.0, 1.0, 3.0],
            vec![10.0, 2.0, 4.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn test_zero_previous_scans_is_identity() {
        let mut filter = TemporalMedianFilter::new(0).unwrap();
        for scan in scans() {
            assert_eq!(filter.update(&scan).unwrap(), scan);
            assert_eq!(filter.window_len(), 1);
        }
    }

    #[test]
    fn test_three_previous_scans() {
        let mut filter = TemporalMedianFilter::new(3).unwrap();
        let expected = vec![
            vec![0.0, 1.0, 2.0, 1.0, 3.0],
            vec![0.5, 3.0, 4.5, 1.0, 3.0],
            vec![1.0, 3.0, 4.0, 1.0, 3.0],
            vec![1.5, 3.0, 3.5, 1.0, 3.0],
            vec![2.5, 3.0, 4.0, 1.0, 1.5],
        ];
        for (scan, expected) in scans().iter().zip(expected) {
            assert_eq!(filter.update(scan).unwrap(), expected);
        }
    }

    #[test]
    fn test_five_previous_scans() {
        let mut filter = TemporalMedianFilter::new(5).unwrap();
        let expected = vec![
            vec![0.0, 1.0, 2.0, 1.0, 3.0],
            vec![0.5, 3.0, 4.5, 1.0, 3.0],
            vec![1.0, 3.0, 4.0, 1.0, 3.0],
            vec![1.5, 3.0, 3.5, 1.0, 3.0],
            vec![2.0, 3.0, 4.0, 1.0, 3.0],
        ];
        for (scan, expected) in scans().iter().zip(expected) {
            assert_eq!(filter.update(scan).unwrap(), expected);
        }
    }

    #[test]
    fn test_ndarray_rows() {
        let rows = arr2(&[
            [0.0, 1.0, 2.0, 1.0, 3.0],
            [1.0, 5.0, 7.0, 1.0, 3.0],
        ]);
        let mut filter = TemporalMedianFilter::default();
        assert_eq!(
            filter.update(&rows.row(0)).unwrap(),
            vec![0.0, 1.0, 2.0, 1.0, 3.0]
        );
        assert_eq!(
            filter.update(&rows.row(1)).unwrap(),
            vec![0.5, 3.0, 4.5, 1.0, 3.0]
        );
    }

    #[test]
    fn test_window_saturates() {
        let mut filter = TemporalMedianFilter::new(2).unwrap();
        for (i, scan) in scans().iter().enumerate() {
            filter.update(scan).unwrap();
            assert_eq!(filter.window_len(), (i + 1).min(3));
        }
    }

    #[test]
    fn test_mismatched_scan_rejected() {
        let mut filter = TemporalMedianFilter::new(3).unwrap();
        filter.update(&[1.0, 2.0, 3.0]).unwrap();

        let err = filter.update(&[1.0, 2.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(matches!(
            err,
            FilterError::MeasurementCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(filter.window_len(), 1);
        assert_eq!(filter.measurement_count(), Some(3));
    }

    #[test]
    fn test_mismatch_at_capacity_does_not_evict() {
        let mut clean = TemporalMedianFilter::new(1).unwrap();
        let mut noisy = TemporalMedianFilter::new(1).unwrap();

        for scan in [[1.0, 1.0], [3.0, 5.0]] {
            clean.update(&scan).unwrap();
            noisy.update(&scan).unwrap();
        }
        assert!(noisy.update(&[9.0, 9.0, 9.0]).is_err());
        assert_eq!(noisy.window_len(), 2);

        assert_eq!(
            noisy.update(&[7.0, 7.0]).unwrap(),
            clean.update(&[7.0, 7.0]).unwrap()
        );
    }

    #[test]
    fn test_invalid_input_type_leaves_state() {
        let mut filter = TemporalMedianFilter::new(3).unwrap();
        filter.update(&[1.0, 2.0]).unwrap();

        let err = filter.update(&serde_json::json!("1,2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert_eq!(filter.window_len(), 1);
    }

    #[test]
    fn test_integer_scans_average_as_float() {
        let mut filter = TemporalMedianFilter::new(1).unwrap();
        filter.update(&[1, 2]).unwrap();
        assert_eq!(filter.update(&[2, 5]).unwrap(), vec![1.5, 3.5]);
    }

    #[test]
    fn test_empty_scans() {
        let mut filter = TemporalMedianFilter::new(2).unwrap();
        let empty: [f64; 0] = [];
        assert!(filter.update(&empty).unwrap().is_empty());
        assert!(filter.update(&empty).unwrap().is_empty());
        assert_eq!(filter.measurement_count(), Some(0));
        assert!(filter.update(&[1.0]).is_err());
    }

    #[test]
    fn test_reset_forgets_measurement_count() {
        let mut filter = TemporalMedianFilter::new(3).unwrap();
        filter.update(&[1.0, 2.0, 3.0]).unwrap();
        filter.update(&[3.0, 2.0, 1.0]).unwrap();
        assert!(filter.is_primed());

        filter.reset();
        assert!(!filter.is_primed());
        assert_eq!(filter.measurement_count(), None);

        assert_eq!(filter.update(&[4.0, 5.0]).unwrap(), vec![4.0, 5.0]);
        assert_eq!(filter.measurement_count(), Some(2));
    }

    #[test]
    fn test_try_new() {
        assert_eq!(TemporalMedianFilter::try_new(4).unwrap().num_prev_scans(), 4);
        assert_eq!(TemporalMedianFilter::try_new(0).unwrap().num_prev_scans(), 0);

        let err = TemporalMedianFilter::try_new(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_default_window() {
        let filter = TemporalMedianFilter::default();
        assert_eq!(filter.num_prev_scans(), DEFAULT_NUM_PREV_SCANS);
        assert_eq!(filter.measurement_count(), None);
        assert_eq!(filter.history.capacity(), DEFAULT_NUM_PREV_SCANS + 1);
    }

    #[test]
    fn test_window_size_overflow_rejected() {
        let err = TemporalMedianFilter::new(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(err.to_string().contains("num_prev_scans"));
    }

    #[test]
    fn test_huge_window_with_wide_scans() {
        let mut filter = TemporalMedianFilter::try_new(i64::MAX).unwrap();
        let first = vec![1.0; 1080];
        let second = vec![3.0; 1080];
        assert_eq!(filter.update(&first).unwrap(), first);
        assert_eq!(filter.update(&second).unwrap(), vec![2.0; 1080]);
        assert_eq!(filter.window_len(), 2);

        let mut filter = TemporalMedianFilter::new(100_000_000).unwrap();
        assert_eq!(filter.update(&first).unwrap().len(), 1080);
    }

    #[test]
    fn test_accepted_scans_counts_only_accepted() {
        let mut filter = TemporalMedianFilter::new(1).unwrap();
        for scan in scans() {
            filter.update(&scan).unwrap();
        }
        assert!(filter.update(&[1.0]).is_err());
        assert_eq!(filter.accepted_scans(), 5);
        assert_eq!(filter.window_len(), 2);

        filter.reset();
        assert_eq!(filter.accepted_scans(), 0);
    }

    #[test]
    fn test_check_len() {
        let mut filter = TemporalMedianFilter::new(2).unwrap();
        assert!(filter.check_len(7).is_ok());
        filter.update(&[1.0, 2.0]).unwrap();
        assert!(filter.check_len(2).is_ok());
        assert!(filter.check_len(3).is_err());
        assert_eq!(filter.window_len(), 1);
    }
}
