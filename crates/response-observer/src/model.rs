use serde::{Deserialize, Serialize};

/// How one tracking cycle ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamOutcome {
    /// The reply length held still for the configured number of samples.
    Completed { text: String, samples: u32 },
    /// The ceiling elapsed while the reply was still changing.
    TimedOut { text: String, samples: u32 },
    /// Tracking never started because the pipeline stopped before submit.
    Abandoned { reason: String },
}

impl StreamOutcome {
    pub fn text(&self) -> &str {
        match self {
            StreamOutcome::Completed { text, .. } | StreamOutcome::TimedOut { text, .. } => text,
            StreamOutcome::Abandoned { .. } => "",
        }
    }

    pub fn samples(&self) -> u32 {
        match self {
            StreamOutcome::Completed { samples, .. } | StreamOutcome::TimedOut { samples, .. } => {
                *samples
            }
            StreamOutcome::Abandoned { .. } => 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StreamOutcome::Completed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StreamOutcome::Completed { .. } => "completed",
            StreamOutcome::TimedOut { .. } => "timed_out",
            StreamOutcome::Abandoned { .. } => "abandoned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abandoned_cycle_carries_no_text() {
        let outcome = StreamOutcome::Abandoned {
            reason: "element is not editable".into(),
        };
        assert_eq!(outcome.text(), "");
        assert_eq!(outcome.samples(), 0);
        assert!(!outcome.is_completed());
        assert_eq!(outcome.label(), "abandoned");
    }
}
