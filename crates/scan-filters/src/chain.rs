//! Filter Composition

use crate::error::FilterError;
use crate::normalizer::ScanSource;
use tracing::debug;

/// A filter over already-normalized scans
pub trait ScanFilter {
    /// Filter one flat scan
    fn apply(&mut self, scan: &[f64]) -> Result<Vec<f64>, FilterError>;

    /// Check whether a scan of `len` measurements would be accepted,
    /// without changing any state
    fn check_len(&self, _len: usize) -> Result<(), FilterError> {
        Ok(())
    }

    /// Drop any state accumulated across scans
    fn reset(&mut self) {}

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Ordered sequence of filters applied one after another.
///
/// Every stage preserves scan length, so each stage is asked up front whether
/// it accepts the scan; a scan rejected by any stage reaches none of them.
#[derive(Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn ScanFilter + Send>>,
}

impl FilterChain {
    /// Create an empty chain, which returns scans unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn with<F: ScanFilter + Send + 'static>(mut self, filter: F) -> Self {
        self.push(filter);
        self
    }

    /// Append a stage
    pub fn push<F: ScanFilter + Send + 'static>(&mut self, filter: F) {
        debug!("Adding {} stage to filter chain", filter.name());
        self.stages.push(Box::new(filter));
    }

    /// Get the number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the chain has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get stage names in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Normalize a scan once and run it through every stage
    pub fn update<S: ScanSource + ?Sized>(&mut self, scan: &S) -> Result<Vec<f64>, FilterError> {
        let scan = scan.to_scan()?;
        self.apply(&scan)
    }

    /// Reset every stage
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

impl ScanFilter for FilterChain {
    fn apply(&mut self, scan: &[f64]) -> Result<Vec<f64>, FilterError> {
        self.check_len(scan.len())?;
        let mut current = scan.to_vec();
        for stage in &mut self.stages {
            current = stage.apply(&current)?;
        }
        Ok(current)
    }

    fn check_len(&self, len: usize) -> Result<(), FilterError> {
        self.stages.iter().try_for_each(|stage| stage.check_len(len))
    }

    fn reset(&mut self) {
        FilterChain::reset(self);
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
