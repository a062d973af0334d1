use std::time::Duration;

use response_observer::ObserverConfig;
use serde::{Deserialize, Serialize};
use tool_click::TriggerTimings;
use tool_type_text::CommitTimings;

/// Pipeline delays owned by the adapter itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterTimings {
    /// Between commit and submit, so the page can process the input.
    pub settle_ms: u64,
    /// Between submit and arming the reply tracker.
    pub observe_delay_ms: u64,
    /// How long the sending flag stays held after a pipeline ends.
    pub cooldown_ms: u64,
}

impl AdapterTimings {
    pub fn observe_delay(&self) -> Duration {
        Duration::from_millis(self.observe_delay_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for AdapterTimings {
    fn default() -> Self {
        Self {
            settle_ms: 300,
            observe_delay_ms: 2000,
            cooldown_ms: 1000,
        }
    }
}

/// Every tunable of one adapter.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub adapter: AdapterTimings,
    pub committer: CommitTimings,
    pub trigger: TriggerTimings,
    pub observer: ObserverConfig,
}

impl AdapterConfig {
    /// Committer timings with the adapter's settle delay applied.
    pub fn commit_timings(&self) -> CommitTimings {
        CommitTimings {
            settle_ms: self.adapter.settle_ms,
            ..self.committer.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_merge_with_defaults() {
        let yaml = "adapter:\n  cooldown_ms: 1500\nobserver:\n  stable_samples: 5\n";
        let config: AdapterConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.adapter.cooldown_ms, 1500);
        assert_eq!(config.adapter.observe_delay_ms, 2000);
        assert_eq!(config.observer.stable_samples, 5);
        assert_eq!(config.observer.poll_interval_ms, 200);
        assert_eq!(config.trigger.highlight_ms, 3000);
    }

    #[test]
    fn adapter_settle_wins_over_committer_default() {
        let mut config = AdapterConfig::default();
        config.adapter.settle_ms = 450;
        assert_eq!(config.commit_timings().settle_ms, 450);
        assert_eq!(config.commit_timings().paste_delay_ms, 100);
    }
}
