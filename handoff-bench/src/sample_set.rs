use std::num::NonZeroUsize;
use std::sync::OnceLock;

use handoff_common::Result;

use crate::stats::{self, Bin, Stats};

/// The frozen samples of one strategy run, in receipt order.
///
/// `Stats` and `Bins` are derived on first access and cached for the lifetime of the set.
#[derive(Debug, Clone)]
pub struct SampleSet {
    values: Vec<u64>,
    bin_count: Option<NonZeroUsize>,
    stats: OnceLock<Stats>,
    bins: OnceLock<Vec<Bin>>,
}

impl SampleSet {
    pub fn from_values(values: Vec<u64>) -> Self {
        Self { values, bin_count: None, stats: OnceLock::new(), bins: OnceLock::new() }
    }

    /// Use a fixed number of histogram bins instead of the `sqrt(n)` default.
    pub fn with_bin_count(mut self, bin_count: NonZeroUsize) -> Self {
        self.bin_count = Some(bin_count);
        self.bins = OnceLock::new();
        self
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn stats(&self) -> &Stats {
        self.stats.get_or_init(|| Stats::compute(&self.values))
    }

    pub fn bins(&self) -> &[Bin] {
        self.bins.get_or_init(|| match self.bin_count {
            Some(n) => stats::histogram(&self.values, n),
            None => stats::auto_histogram(&self.values),
        })
    }

    /// Arbitrary percentile, for callers that need more than the fixed set in [`Stats`].
    pub fn percentile(&self, p: f64) -> Result<u64> {
        stats::percentile(&self.values, p)
    }
}
