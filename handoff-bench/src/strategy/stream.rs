use std::pin::pin;
use std::time::{Duration, Instant};

use futures::stream::{self, Stream, StreamExt};
use handoff_common::{HandoffError, Result, Strategy};
use tokio::sync::mpsc;

use super::{join_receiver, pause, start_run, LatencyReceiver, PushLatencyTest};
use crate::sample_set::SampleSet;

/// Producer for the pull-driven variant: each poll sleeps one cadence, then yields the
/// issue timestamp. Ends after `count` items.
pub fn timestamps(count: usize, cadence: Duration) -> impl Stream<Item = Instant> + Send {
    stream::unfold(count, move |remaining| async move {
        if remaining == 0 {
            return None;
        }
        pause(cadence).await;
        Some((Instant::now(), remaining - 1))
    })
}

/// Drain `source` into `receiver` until it ends.
async fn consume(source: impl Stream<Item = Instant>, receiver: LatencyReceiver) -> Result<()> {
    let mut source = pin!(source);
    while let Some(issued_at) = source.next().await {
        receiver.receive(issued_at)?;
    }
    Ok(())
}

/// The receiver task pulls timestamps from a producer stream at its own pace.
#[derive(Debug, Clone)]
pub struct PullStream {
    cadence: Duration,
}

impl PullStream {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for PullStream {
    fn strategy(&self) -> Strategy {
        Strategy::PullStream
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let consumer = tokio::spawn(consume(timestamps(count, self.cadence), receiver));
        collector.wait_complete().await?;
        join_receiver(consumer, "pull stream consumer").await?;
        collector.finish()
    }
}

/// The caller pushes timestamps into an unbounded buffer that a long-running consumer
/// task drains.
#[derive(Debug, Clone)]
pub struct PushStream {
    cadence: Duration,
}

impl PushStream {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for PushStream {
    fn strategy(&self) -> Strategy {
        Strategy::PushStream
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Instant>();
        let consumer = tokio::spawn(async move {
            while let Some(issued_at) = rx.recv().await {
                receiver.receive(issued_at)?;
            }
            Ok::<(), HandoffError>(())
        });

        for _ in 0..count {
            tx.send(Instant::now())
                .map_err(|_| HandoffError::HandoffClosed("push stream consumer".to_string()))?;
            pause(self.cadence).await;
        }

        collector.wait_complete().await?;
        drop(tx);
        join_receiver(consumer, "push stream consumer").await?;
        collector.finish()
    }
}
