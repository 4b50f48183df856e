use handoff_common::config::MAX_AUTO_BINS;
use handoff_common::{HandoffError, Result};
use std::num::NonZeroUsize;
use std::ops::Range;

/// Summary of one sample set. Every field except `count` is in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub count: usize,
    pub minimum: u64,
    /// Arithmetic mean, truncated.
    pub average: u64,
    pub maximum: u64,
    pub p1: u64,
    pub p10: u64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
}

impl Stats {
    /// Compute summary statistics over `samples` in any order. The slice itself is left
    /// untouched; an empty slice yields all zeroes.
    pub fn compute(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let sorted = sorted_copy(samples);
        let count = sorted.len();
        let sum: u128 = sorted.iter().map(|&v| u128::from(v)).sum();

        Self {
            count,
            minimum: sorted[0],
            average: (sum / count as u128) as u64,
            maximum: sorted[count - 1],
            p1: interpolate(&sorted, 0.01),
            p10: interpolate(&sorted, 0.10),
            p50: interpolate(&sorted, 0.50),
            p90: interpolate(&sorted, 0.90),
            p99: interpolate(&sorted, 0.99),
            p999: interpolate(&sorted, 0.999),
        }
    }
}

/// Percentile `p` (a fraction in `[0, 1]`) of unsorted `samples`.
/// Returns 0 for an empty slice.
pub fn percentile(samples: &[u64], p: f64) -> Result<u64> {
    check_probability(p)?;
    if samples.is_empty() {
        return Ok(0);
    }
    Ok(interpolate(&sorted_copy(samples), p))
}

/// Same as [`percentile`] for input already sorted ascending.
pub fn percentile_sorted(sorted: &[u64], p: f64) -> Result<u64> {
    check_probability(p)?;
    if sorted.is_empty() {
        return Ok(0);
    }
    Ok(interpolate(sorted, p))
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(HandoffError::InvalidArgument(format!(
            "percentile probability {p} outside [0, 1]"
        )));
    }
    Ok(())
}

fn sorted_copy(samples: &[u64]) -> Vec<u64> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    sorted
}

/// Linear interpolation between closest ranks: `h = p * (n - 1)`, blend `v[floor(h)]`
/// towards its successor by the fractional part of `h`, truncating to whole nanoseconds.
/// `sorted` must be non-empty and `p` already checked.
fn interpolate(sorted: &[u64], p: f64) -> u64 {
    let h = p * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;
    let base = sorted[lo];
    match sorted.get(lo + 1) {
        Some(&next) => base + (frac * (next - base) as f64) as u64,
        None => base,
    }
}

/// One equal-width slice of a sample set's value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub index: usize,
    /// Half-open `[start, end)`; the last bin also holds values equal to the maximum.
    pub range: Range<f64>,
    pub count: usize,
}

/// `ceil(sqrt(n))`, clamped to `1..=MAX_AUTO_BINS`.
pub fn default_bin_count(sample_count: usize) -> NonZeroUsize {
    let n = ((sample_count as f64).sqrt().ceil() as usize).clamp(1, MAX_AUTO_BINS);
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

/// Histogram with [`default_bin_count`] bins.
pub fn auto_histogram(samples: &[u64]) -> Vec<Bin> {
    histogram(samples, default_bin_count(samples.len()))
}

/// Partition `[min, max]` of `samples` into `bin_count` equal-width bins and count the
/// samples in each. Empty bins are kept so the bins tile the whole range.
///
/// When every sample has the same value there is nothing to partition, and the result is
/// a single bin `[value, value + 1)`. An empty slice yields no bins.
pub fn histogram(samples: &[u64], bin_count: NonZeroUsize) -> Vec<Bin> {
    if samples.is_empty() {
        return Vec::new();
    }
    let (min, max) = samples
        .iter()
        .fold((u64::MAX, u64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;

    if span == 0 {
        return vec![Bin { index: 0, range: min as f64..min as f64 + 1.0, count: samples.len() }];
    }

    let bins = bin_count.get();
    let mut counts = vec![0usize; bins];
    for &v in samples {
        // Integer arithmetic keeps the assignment exact; only `max` lands on `bins`.
        let idx = (u128::from(v - min) * bins as u128 / u128::from(span)) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let edge = |i: usize| min as f64 + span as f64 * i as f64 / bins as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| {
            let end = if index + 1 == bins { max as f64 } else { edge(index + 1) };
            Bin { index, range: edge(index)..end, count }
        })
        .collect()
}
