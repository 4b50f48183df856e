use std::time::{Duration, Instant};

use handoff_common::{HandoffError, Result, Strategy};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{pause, start_run, LatencyReceiver, PushLatencyTest};
use crate::sample_set::SampleSet;

const MAILBOX_CAPACITY: usize = 16;

enum Message {
    Receive { issued_at: Instant, done: oneshot::Sender<Result<()>> },
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Receive { issued_at, .. } => {
                f.debug_struct("Receive").field("issued_at", issued_at).finish()
            }
        }
    }
}

/// Owns the receiver outright; the mailbox is the only way to reach it, so operations
/// run one at a time in arrival order.
struct ReceiverActor {
    receiver: LatencyReceiver,
    mailbox: mpsc::Receiver<Message>,
}

impl ReceiverActor {
    async fn run(mut self) {
        while let Some(message) = self.mailbox.recv().await {
            match message {
                Message::Receive { issued_at, done } => {
                    // The caller may have given up waiting; nothing to do then.
                    done.send(self.receiver.receive(issued_at)).ok();
                }
            }
        }
        debug!("receiver actor mailbox closed");
    }
}

/// Handle to a spawned receiver actor. Dropping every handle stops the actor.
#[derive(Debug, Clone)]
pub struct ActorHandle {
    mailbox: mpsc::Sender<Message>,
}

impl ActorHandle {
    pub fn spawn(receiver: LatencyReceiver) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let actor = ReceiverActor { receiver, mailbox: rx };
        (Self { mailbox: tx }, tokio::spawn(actor.run()))
    }

    /// Ask the actor to stamp and record `issued_at`; suspends until it has done so.
    pub async fn receive(&self, issued_at: Instant) -> Result<()> {
        let (done, done_rx) = oneshot::channel();
        self.mailbox
            .send(Message::Receive { issued_at, done })
            .await
            .map_err(|_| HandoffError::HandoffClosed("receiver actor mailbox".to_string()))?;
        done_rx
            .await
            .map_err(|_| HandoffError::HandoffClosed("receiver actor reply".to_string()))?
    }
}

/// Serialized single-owner access: each push is a call into the receiver actor that
/// returns only after the actor's turn has recorded it.
#[derive(Debug, Clone)]
pub struct SerializedOwner {
    cadence: Duration,
}

impl SerializedOwner {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for SerializedOwner {
    fn strategy(&self) -> Strategy {
        Strategy::SerializedOwner
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let (actor, task) = ActorHandle::spawn(receiver);
        for _ in 0..count {
            actor.receive(Instant::now()).await?;
            pause(self.cadence).await;
        }
        drop(actor);
        task.await
            .map_err(|e| HandoffError::HandoffClosed(format!("receiver actor task failed: {e}")))?;
        collector.finish()
    }
}
