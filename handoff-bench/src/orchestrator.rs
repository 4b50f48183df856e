use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use handoff_common::{BenchConfig, Result, Strategy};
use tracing::info;

use crate::sample_set::SampleSet;
use crate::strategy::run_strategy;

/// Outcome of a suite run: total wall-clock time and one sample set per strategy.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub elapsed: Duration,
    pub results: BTreeMap<Strategy, SampleSet>,
}

impl SuiteReport {
    /// Whole seconds, as shown by the elapsed-time readout.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Results ordered by ascending p99, the display order.
    pub fn sorted_by_p99(&self) -> Vec<(Strategy, &SampleSet)> {
        let mut rows: Vec<(Strategy, &SampleSet)> =
            self.results.iter().map(|(&strategy, samples)| (strategy, samples)).collect();
        rows.sort_by_key(|(strategy, samples)| (samples.stats().p99, *strategy));
        rows
    }
}

/// Run `strategies` one after another, never overlapping, so one strategy's tasks and
/// threads cannot disturb another's measurements.
///
/// There is no timeout: a strategy whose receiver never completes stalls the suite.
pub async fn run_all(strategies: &[Strategy], config: &BenchConfig) -> Result<SuiteReport> {
    config.validate()?;
    let bins = config.bins()?;
    let count = config.count_per_strategy;
    let cadence = config.cadence();

    let suite_start = Instant::now();
    let mut results = BTreeMap::new();

    for &strategy in strategies {
        info!(strategy = strategy.as_name(), count, "running strategy");
        let samples = run_strategy(strategy, count, cadence).await?;
        let samples = match bins {
            Some(n) => samples.with_bin_count(n),
            None => samples,
        };
        let stats = samples.stats();
        info!(
            strategy = strategy.as_name(),
            p50_ns = stats.p50,
            p99_ns = stats.p99,
            max_ns = stats.maximum,
            "strategy finished"
        );
        results.insert(strategy, samples);
    }

    let elapsed = suite_start.elapsed();
    info!(elapsed_secs = elapsed.as_secs_f64(), strategies = results.len(), "suite finished");
    Ok(SuiteReport { elapsed, results })
}

/// Run every strategy in [`Strategy::ALL`] with `count_per_strategy` pushes at the
/// reference cadence.
pub async fn run_benchmark_suite(count_per_strategy: usize) -> Result<SuiteReport> {
    let config = BenchConfig { count_per_strategy, ..BenchConfig::default() };
    run_all(&Strategy::ALL, &config).await
}
