use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use handoff_common::{Result, Strategy};
use tracing::error;

use super::worker::{DedicatedWorker, WorkerHandle};
use super::{pause, start_run, PushLatencyTest};
use crate::sample_set::SampleSet;

type Subscriber<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;

/// Synchronous publish/subscribe subject: `publish` runs every subscriber callback before
/// it returns, in subscription order.
pub struct Subject<T> {
    subscribers: RwLock<Vec<Subscriber<T>>>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    pub fn new() -> Self {
        Self { subscribers: RwLock::new(Vec::new()) }
    }

    pub fn subscribe(&self, subscriber: impl Fn(T) -> Result<()> + Send + Sync + 'static) {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(subscriber));
    }

    /// Subscribe with delivery redirected onto `worker`: `publish` only queues the value,
    /// and `subscriber` runs later on the worker thread. Its errors are logged there.
    pub fn subscribe_on(
        &self,
        worker: WorkerHandle,
        subscriber: impl Fn(T) -> Result<()> + Send + Sync + 'static,
    ) {
        let subscriber = Arc::new(subscriber);
        self.subscribe(move |value| {
            let subscriber = Arc::clone(&subscriber);
            worker.submit(move || {
                if let Err(e) = subscriber(value) {
                    error!(error = %e, "subscriber failed on worker");
                }
            })
        });
    }

    /// Deliver `value` to every subscriber, stopping at the first failure.
    /// Returns how many subscribers received it.
    pub fn publish(&self, value: T) -> Result<usize> {
        let subscribers = self.subscribers.read().unwrap_or_else(PoisonError::into_inner);
        for subscriber in subscribers.iter() {
            subscriber(value.clone())?;
        }
        Ok(subscribers.len())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.read().map(|s| s.len()).unwrap_or_default();
        f.debug_struct("Subject").field("subscribers", &count).finish()
    }
}

/// Publish to a subject whose subscriber records the receipt inside the publish call.
#[derive(Debug, Clone)]
pub struct Broadcast {
    cadence: Duration,
}

impl Broadcast {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for Broadcast {
    fn strategy(&self) -> Strategy {
        Strategy::Broadcast
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let subject = Subject::<Instant>::new();
        subject.subscribe(move |issued_at| receiver.receive(issued_at));
        for _ in 0..count {
            subject.publish(Instant::now())?;
            pause(self.cadence).await;
        }
        collector.finish()
    }
}

/// Same subject, but the subscription delivers onto a dedicated worker thread, so
/// `publish` returns before the receipt is recorded.
#[derive(Debug, Clone)]
pub struct BroadcastWorker {
    cadence: Duration,
}

impl BroadcastWorker {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for BroadcastWorker {
    fn strategy(&self) -> Strategy {
        Strategy::BroadcastWorker
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let worker = DedicatedWorker::spawn("handoff-broadcast")?;
        let subject = Subject::<Instant>::new();
        subject.subscribe_on(worker.handle(), move |issued_at| receiver.receive(issued_at));
        for _ in 0..count {
            subject.publish(Instant::now())?;
            pause(self.cadence).await;
        }
        collector.wait_complete().await?;
        // The subscription holds a queue handle; release it before stopping the worker.
        drop(subject);
        worker.shutdown()?;
        collector.finish()
    }
}
