use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stability debounce parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub poll_interval_ms: u64,
    /// Consecutive unchanged samples that mark a reply complete.
    pub stable_samples: u32,
    /// Hard ceiling on one tracking cycle.
    pub ceiling_ms: u64,
}

impl ObserverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms)
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            stable_samples: 10,
            ceiling_ms: 120_000,
        }
    }
}
