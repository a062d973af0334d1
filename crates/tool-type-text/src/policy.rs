use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delays used while committing text.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitTimings {
    /// Pause the caller takes between commit and submission.
    pub settle_ms: u64,
    /// Gap between the clipboard write and the paste event.
    pub paste_delay_ms: u64,
    /// Gap after focusing and after clearing during typing emulation.
    pub focus_delay_ms: u64,
    pub keystroke_delay_ms: u64,
}

impl CommitTimings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn paste_delay(&self) -> Duration {
        Duration::from_millis(self.paste_delay_ms)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_ms)
    }
}

impl Default for CommitTimings {
    fn default() -> Self {
        Self {
            settle_ms: 300,
            paste_delay_ms: 100,
            focus_delay_ms: 50,
            keystroke_delay_ms: 10,
        }
    }
}
