use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use handoff_common::{HandoffError, Result, Strategy};
use tracing::{debug, error};

use super::{pause, start_run, PushLatencyTest};
use crate::sample_set::SampleSet;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Command {
    Run(Job),
    Stop,
}

/// Cloneable submission side of a [`DedicatedWorker`].
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    name: String,
    queue: mpsc::Sender<Command>,
}

impl WorkerHandle {
    /// Queue `job` behind everything already submitted.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.queue
            .send(Command::Run(Box::new(job)))
            .map_err(|_| HandoffError::HandoffClosed(format!("worker {} queue", self.name)))
    }
}

/// One OS thread running submitted jobs in FIFO order.
///
/// [`shutdown`](Self::shutdown) lets already queued jobs finish before the thread exits;
/// dropping the worker does the same but discards the outcome.
#[derive(Debug)]
pub struct DedicatedWorker {
    handle: WorkerHandle,
    thread: Option<JoinHandle<()>>,
}

impl DedicatedWorker {
    pub fn spawn(name: &str) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Command>();
        let thread_name = name.to_string();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for command in rx {
                    match command {
                        Command::Run(job) => job(),
                        Command::Stop => break,
                    }
                }
                debug!(worker = %thread_name, "dedicated worker stopped");
            })
            .map_err(|e| HandoffError::WorkerSpawn(e.to_string()))?;
        debug!(worker = name, "dedicated worker started");
        Ok(Self {
            handle: WorkerHandle { name: name.to_string(), queue: tx },
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> WorkerHandle {
        self.handle.clone()
    }

    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<()> {
        self.handle.submit(job)
    }

    /// Stop after the queued jobs and join the thread.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // A send failure means the thread is already gone; join reports why.
        self.handle.queue.send(Command::Stop).ok();
        thread
            .join()
            .map_err(|_| HandoffError::HandoffClosed(format!("worker {} panicked", self.handle.name)))
    }
}

impl Drop for DedicatedWorker {
    fn drop(&mut self) {
        self.stop_and_join().ok();
    }
}

/// Submit a job that stamps and records `issued_at`; failures on the worker are logged
/// because nothing on that thread can return them.
pub(crate) fn submit_receipt(
    worker: &WorkerHandle,
    receiver: super::LatencyReceiver,
    issued_at: Instant,
) -> Result<()> {
    worker.submit(move || {
        if let Err(e) = receiver.receive(issued_at) {
            error!(error = %e, "worker failed to record sample");
        }
    })
}

/// The caller hands each push straight to a dedicated worker thread, which stamps the
/// receipt when it gets to the job.
#[derive(Debug, Clone)]
pub struct WorkerDispatch {
    cadence: Duration,
}

impl WorkerDispatch {
    pub fn new(cadence: Duration) -> Self {
        Self { cadence }
    }
}

impl PushLatencyTest for WorkerDispatch {
    fn strategy(&self) -> Strategy {
        Strategy::WorkerDispatch
    }

    async fn run(&self, count: usize) -> Result<SampleSet> {
        let (collector, receiver) = start_run(count)?;
        let worker = DedicatedWorker::spawn("handoff-dispatch")?;
        let queue = worker.handle();
        for _ in 0..count {
            submit_receipt(&queue, receiver.clone(), Instant::now())?;
            pause(self.cadence).await;
        }
        collector.wait_complete().await?;
        drop(queue);
        worker.shutdown()?;
        collector.finish()
    }
}
