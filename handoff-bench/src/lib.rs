pub mod collector;
pub mod orchestrator;
pub mod report;
pub mod sample_set;
pub mod stats;
pub mod strategy;

pub use collector::Collector;
pub use orchestrator::{run_all, run_benchmark_suite, SuiteReport};
pub use sample_set::SampleSet;
pub use stats::{Bin, Stats};
pub use strategy::{run_strategy, LatencyReceiver, PushLatencyTest};
