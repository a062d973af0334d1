use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerTimings {
    pub between_strategies_ms: u64,
    pub event_gap_ms: u64,
    /// How long a control stays highlighted after being flagged for manual action.
    pub highlight_ms: u64,
}

impl TriggerTimings {
    pub fn between_strategies(&self) -> Duration {
        Duration::from_millis(self.between_strategies_ms)
    }

    pub fn event_gap(&self) -> Duration {
        Duration::from_millis(self.event_gap_ms)
    }

    pub fn highlight(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }
}

impl Default for TriggerTimings {
    fn default() -> Self {
        Self {
            between_strategies_ms: 200,
            event_gap_ms: 50,
            highlight_ms: 3000,
        }
    }
}
