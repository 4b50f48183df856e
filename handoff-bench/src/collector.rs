use std::sync::{Mutex, MutexGuard, PoisonError};

use handoff_common::{HandoffError, Result};
use tokio::sync::watch;

use crate::sample_set::SampleSet;

/// Fixed-capacity, append-only sample buffer for one strategy run.
///
/// The buffer sits behind a mutex so that only one writer appends at a time, whichever
/// thread or task the receiver happens to run on. Completion is a watch flag flipped
/// exactly once, by the append that reaches `target`; it releases every current waiter and
/// any waiter that arrives later.
#[derive(Debug)]
pub struct Collector {
    target: usize,
    values: Mutex<Vec<u64>>,
    complete: watch::Sender<bool>,
}

impl Collector {
    pub fn new(target: usize) -> Self {
        let (complete, _) = watch::channel(target == 0);
        Self { target, values: Mutex::new(Vec::with_capacity(target)), complete }
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn len(&self) -> usize {
        self.lock_values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_complete(&self) -> bool {
        *self.complete.borrow()
    }

    /// Record one sample. Fails with `CollectorOverflow` once `target` samples are held.
    pub fn append(&self, sample: u64) -> Result<()> {
        let mut values = self.lock_values();
        if values.len() >= self.target {
            return Err(HandoffError::CollectorOverflow(self.target));
        }
        values.push(sample);
        if values.len() == self.target {
            self.complete.send_replace(true);
        }
        Ok(())
    }

    /// Suspend until `target` samples have been appended.
    pub async fn wait_complete(&self) -> Result<()> {
        let mut rx = self.complete.subscribe();
        rx.wait_for(|done| *done)
            .await
            .map(|_| ())
            .map_err(|_| HandoffError::HandoffClosed("collector completion signal".to_string()))
    }

    /// Samples recorded so far, in append order.
    pub fn values(&self) -> Vec<u64> {
        self.lock_values().clone()
    }

    /// Freeze the samples into a [`SampleSet`]. Fails with `Incomplete` if fewer than
    /// `target` samples were recorded.
    pub fn finish(&self) -> Result<SampleSet> {
        let values = self.lock_values();
        if values.len() != self.target {
            return Err(HandoffError::Incomplete { expected: self.target, recorded: values.len() });
        }
        Ok(SampleSet::from_values(values.clone()))
    }

    // A panicking writer cannot leave the Vec half-updated, so a poisoned lock is still usable.
    fn lock_values(&self) -> MutexGuard<'_, Vec<u64>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
