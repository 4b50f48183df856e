use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub use config::BenchConfig;

/// Error types for hand-off benchmark runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandoffError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Collector already holds its target of {0} samples")]
    CollectorOverflow(usize),

    #[error("Run ended with {recorded} of {expected} samples recorded")]
    Incomplete { expected: usize, recorded: usize },

    #[error("Hand-off closed: {0}")]
    HandoffClosed(String),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for hand-off benchmark operations
pub type Result<T> = std::result::Result<T, HandoffError>;

/// The concurrency hand-off patterns under test.
///
/// | Strategy          | Push mechanism                                   | Waits for completion |
/// |-------------------|--------------------------------------------------|----------------------|
/// | DirectCall        | receiver invoked inline                          | no                   |
/// | DirectCallLocked  | inline, receiver takes a mutex first             | no                   |
/// | SerializedOwner   | call into a single-owner actor, awaits its turn  | no                   |
/// | PullStream        | consumer pulls from a sleeping producer stream   | yes                  |
/// | PushStream        | producer feeds a buffered channel                | yes                  |
/// | Broadcast         | subject publishes to subscriber inline           | no                   |
/// | BroadcastWorker   | subject delivers onto a dedicated worker thread  | yes                  |
/// | WorkerDispatch    | work submitted straight to a dedicated worker    | yes                  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    DirectCall,
    DirectCallLocked,
    SerializedOwner,
    PullStream,
    PushStream,
    Broadcast,
    BroadcastWorker,
    WorkerDispatch,
}

impl Strategy {
    /// Every strategy, in the order the suite runs them.
    pub const ALL: [Strategy; 8] = [
        Strategy::DirectCall,
        Strategy::DirectCallLocked,
        Strategy::SerializedOwner,
        Strategy::PullStream,
        Strategy::PushStream,
        Strategy::Broadcast,
        Strategy::BroadcastWorker,
        Strategy::WorkerDispatch,
    ];

    pub fn as_name(&self) -> &'static str {
        match self {
            Strategy::DirectCall => "direct-call",
            Strategy::DirectCallLocked => "direct-call-locked",
            Strategy::SerializedOwner => "serialized-owner",
            Strategy::PullStream => "pull-stream",
            Strategy::PushStream => "push-stream",
            Strategy::Broadcast => "broadcast",
            Strategy::BroadcastWorker => "broadcast-worker",
            Strategy::WorkerDispatch => "worker-dispatch",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_name() == name)
    }

    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::DirectCall => "Direct call",
            Strategy::DirectCallLocked => "Direct call + lock",
            Strategy::SerializedOwner => "Serialized owner (actor)",
            Strategy::PullStream => "Pull-driven stream",
            Strategy::PushStream => "Push-driven stream",
            Strategy::Broadcast => "Broadcast",
            Strategy::BroadcastWorker => "Broadcast + dedicated worker",
            Strategy::WorkerDispatch => "Dedicated worker dispatch",
        }
    }

    /// Returns `true` when the receiver runs independently of the pushing caller, so a
    /// run has to await the collector's completion signal instead of returning inline.
    pub fn waits_for_completion(&self) -> bool {
        matches!(
            self,
            Strategy::PullStream
                | Strategy::PushStream
                | Strategy::BroadcastWorker
                | Strategy::WorkerDispatch
        )
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_name())
    }
}
