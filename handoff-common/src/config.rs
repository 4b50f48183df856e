use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::{HandoffError, Result};

/// Samples recorded per strategy in the reference configuration.
pub const DEFAULT_COUNT_PER_STRATEGY: usize = 2_000;

/// Delay between successive pushes: one frame of a 60 Hz workload.
pub const DEFAULT_CADENCE_NANOS: u64 = 1_000_000_000 / 60;

/// Upper bound on the automatically chosen histogram bin count.
pub const MAX_AUTO_BINS: usize = 100;

/// Parameters for one suite run.
///
/// Every field has a default, so a JSON file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub count_per_strategy: usize,
    pub cadence_nanos: u64,
    /// `None` picks `ceil(sqrt(n))` bins, capped at [`MAX_AUTO_BINS`].
    pub bin_count: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            count_per_strategy: DEFAULT_COUNT_PER_STRATEGY,
            cadence_nanos: DEFAULT_CADENCE_NANOS,
            bin_count: None,
        }
    }
}

impl BenchConfig {
    pub fn cadence(&self) -> Duration {
        Duration::from_nanos(self.cadence_nanos)
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence_nanos = u64::try_from(cadence.as_nanos()).unwrap_or(u64::MAX);
        self
    }

    /// The explicit histogram bin count, if one was configured.
    pub fn bins(&self) -> Result<Option<NonZeroUsize>> {
        match self.bin_count {
            None => Ok(None),
            Some(n) => NonZeroUsize::new(n)
                .map(Some)
                .ok_or_else(|| HandoffError::InvalidArgument("bin_count must be positive".to_string())),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count_per_strategy == 0 {
            return Err(HandoffError::InvalidArgument(
                "count_per_strategy must be positive".to_string(),
            ));
        }
        self.bins()?;
        Ok(())
    }

    /// Load and validate a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| HandoffError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| HandoffError::Config(format!("cannot parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }
}
