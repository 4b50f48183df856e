use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use handoff_common::{HandoffError, Result, Strategy};
use tokio::task::JoinHandle;

use crate::collector::Collector;
use crate::sample_set::SampleSet;

pub mod actor;
pub mod broadcast;
pub mod direct;
pub mod stream;
pub mod worker;

pub use actor::SerializedOwner;
pub use broadcast::{Broadcast, BroadcastWorker, Subject};
pub use direct::{DirectCall, DirectCallLocked};
pub use stream::{PullStream, PushStream};
pub use worker::{DedicatedWorker, WorkerDispatch, WorkerHandle};

/// The push-latency test every strategy implements.
///
/// `run(count)` issues `count` timestamped pushes, one per cadence tick, through the
/// strategy's hand-off mechanism and returns once the receiver has recorded all of them.
pub trait PushLatencyTest {
    fn strategy(&self) -> Strategy;

    fn run(&self, count: usize) -> impl Future<Output = Result<SampleSet>> + Send;
}

/// Run `strategy` with `count` pushes spaced `cadence` apart.
pub async fn run_strategy(strategy: Strategy, count: usize, cadence: Duration) -> Result<SampleSet> {
    match strategy {
        Strategy::DirectCall => DirectCall::new(cadence).run(count).await,
        Strategy::DirectCallLocked => DirectCallLocked::new(cadence).run(count).await,
        Strategy::SerializedOwner => SerializedOwner::new(cadence).run(count).await,
        Strategy::PullStream => PullStream::new(cadence).run(count).await,
        Strategy::PushStream => PushStream::new(cadence).run(count).await,
        Strategy::Broadcast => Broadcast::new(cadence).run(count).await,
        Strategy::BroadcastWorker => BroadcastWorker::new(cadence).run(count).await,
        Strategy::WorkerDispatch => WorkerDispatch::new(cadence).run(count).await,
    }
}

/// Receiving end shared by every strategy: stamps the receipt time and records
/// `receipt - issue` into the run's collector.
#[derive(Debug, Clone)]
pub struct LatencyReceiver {
    collector: Arc<Collector>,
}

impl LatencyReceiver {
    pub fn new(collector: Arc<Collector>) -> Self {
        Self { collector }
    }

    pub fn receive(&self, issued_at: Instant) -> Result<()> {
        self.record(issued_at, Instant::now())
    }

    pub fn record(&self, issued_at: Instant, received_at: Instant) -> Result<()> {
        self.collector.append(elapsed_nanos(issued_at, received_at))
    }
}

/// Nanoseconds from `issued_at` to `received_at`, saturating at zero and `u64::MAX`.
pub fn elapsed_nanos(issued_at: Instant, received_at: Instant) -> u64 {
    u64::try_from(received_at.saturating_duration_since(issued_at).as_nanos()).unwrap_or(u64::MAX)
}

/// Fresh collector for a run of `count` pushes, plus the receiver that feeds it.
pub(crate) fn start_run(count: usize) -> Result<(Arc<Collector>, LatencyReceiver)> {
    if count == 0 {
        return Err(HandoffError::InvalidArgument("push count must be positive".to_string()));
    }
    let collector = Arc::new(Collector::new(count));
    let receiver = LatencyReceiver::new(Arc::clone(&collector));
    Ok((collector, receiver))
}

/// Inter-push delay. A zero cadence skips the timer entirely.
pub(crate) async fn pause(cadence: Duration) {
    if !cadence.is_zero() {
        tokio::time::sleep(cadence).await;
    }
}

/// Wait for a background receiver task and surface its failure.
pub(crate) async fn join_receiver(task: JoinHandle<Result<()>>, what: &str) -> Result<()> {
    task.await
        .map_err(|e| HandoffError::HandoffClosed(format!("{what} task failed: {e}")))?
}
