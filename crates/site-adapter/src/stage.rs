use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Position of an adapter in its injection pipeline.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionStage {
    #[default]
    Idle,
    Locating,
    Committing,
    Settling,
    Submitting,
    ArmingObserver,
}

impl InjectionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectionStage::Idle => "idle",
            InjectionStage::Locating => "locating",
            InjectionStage::Committing => "committing",
            InjectionStage::Settling => "settling",
            InjectionStage::Submitting => "submitting",
            InjectionStage::ArmingObserver => "arming_observer",
        }
    }
}

impl std::fmt::Display for InjectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current stage, traced on every transition.
#[derive(Debug, Default)]
pub(crate) struct StageCell {
    current: Mutex<InjectionStage>,
}

impl StageCell {
    pub(crate) fn get(&self) -> InjectionStage {
        *self.current.lock()
    }

    pub(crate) fn enter(&self, next: InjectionStage) {
        let previous = std::mem::replace(&mut *self.current.lock(), next);
        if previous != next {
            info!(from = previous.as_str(), to = next.as_str(), "stage transition");
        }
    }

    /// Returns the cell to `Idle` when the guard drops, whichever way the pipeline ends.
    pub(crate) fn idle_on_drop(&self) -> IdleGuard<'_> {
        IdleGuard { cell: self }
    }
}

pub(crate) struct IdleGuard<'a> {
    cell: &'a StageCell,
}

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        self.cell.enter(InjectionStage::Idle);
    }
}
