use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use handoff_common::{Result, Strategy};

use super::{pause, start_run, LatencyReceiver, PushLatencyTest};
use crate::sample_set::SampleSet;

/// The caller invokes the receiver inline; receipt happens inside the push call.
#[derive(Debug, Clone)]
pub struct DirectCall {
    cadence: Duration,
}

impl DirectCall {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for DirectCall {
    fn strategy(&self) -> Strategy {
        Strategy::DirectCall
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        for _ in 0..count {
            receiver.receive(Instant::now())?;
            pause(self.cadence).await;
        }
        collector.finish()
    }
}

/// Receiver that takes an exclusive lock around an empty critical section before stamping.
#[derive(Debug)]
struct LockedReceiver {
    lock: Mutex<()>,
    inner: LatencyReceiver,
}

impl LockedReceiver {
    fn receive(&self, issued_at: Instant) -> Result<()> {
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.inner.receive(issued_at)
    }
}

/// Same as [`DirectCall`], with a mutex acquire/release on the receiving side.
#[derive(Debug, Clone)]
pub struct DirectCallLocked {
    cadence: Duration,
}

impl DirectCallLocked {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for DirectCallLocked {
    fn strategy(&self) -> Strategy {
        Strategy::DirectCallLocked
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, inner) = start_run(count)?;
        let receiver = LockedReceiver { lock: Mutex::new(()), inner };
        for _ in 0..count {
            receiver.receive(Instant::now())?;
            pause(self.cadence).await;
        }
        collector.finish()
    }
}
