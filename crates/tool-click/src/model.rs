use dom_port::ElementRef;
use serde::{Deserialize, Serialize};

/// Result of one activation strategy.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Events were dispatched; whether the page reacted is unknown.
    Attempted,
    /// The strategy had nothing to act on.
    NoOp,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: String,
    pub outcome: AttemptOutcome,
}

/// The page gives no signal that a synthetic submit was accepted, so a trigger never
/// claims confirmation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerVerdict {
    #[default]
    Unconfirmed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerReport {
    /// Element the locator returned.
    pub requested: ElementRef,
    /// Element the strategies acted on.
    pub target: ElementRef,
    pub retargeted: bool,
    pub attempts: Vec<StrategyAttempt>,
    pub verdict: TriggerVerdict,
}

impl TriggerReport {
    pub fn new(requested: ElementRef, target: ElementRef) -> Self {
        Self {
            retargeted: requested != target,
            requested,
            target,
            attempts: Vec::new(),
            verdict: TriggerVerdict::Unconfirmed,
        }
    }

    pub fn record(&mut self, strategy: &str, outcome: AttemptOutcome) {
        self.attempts.push(StrategyAttempt {
            strategy: strategy.to_string(),
            outcome,
        });
    }

    pub fn attempted(&self) -> usize {
        self.attempts
            .iter()
            .filter(|attempt| attempt.outcome == AttemptOutcome::Attempted)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &StrategyAttempt> {
        self.attempts
            .iter()
            .filter(|attempt| matches!(attempt.outcome, AttemptOutcome::Failed(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_tracks_retarget_and_counts() {
        let mut report = TriggerReport::new(ElementRef::new("svg"), ElementRef::new("button"));
        assert!(report.retargeted);
        report.record("direct", AttemptOutcome::Attempted);
        report.record("framework", AttemptOutcome::NoOp);
        report.record("keyboard", AttemptOutcome::Failed("stale".into()));
        assert_eq!(report.attempted(), 1);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.verdict, TriggerVerdict::Unconfirmed);
    }

    #[test]
    fn outcome_serializes_with_reason() {
        let json = serde_json::to_value(AttemptOutcome::Failed("gone".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "gone");
    }
}
