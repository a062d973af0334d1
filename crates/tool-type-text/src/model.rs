use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Path the committer took to get the text into the editor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Native value setter plus synthetic input/change/keydown.
    NativeValue,
    /// Clipboard write plus paste event and `execCommand('paste')`.
    ClipboardPaste,
    /// Per-character keydown / `insertText` / keyup.
    TypingEmulation,
}

impl CommitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitMode::NativeValue => "native_value",
            CommitMode::ClipboardPaste => "clipboard_paste",
            CommitMode::TypingEmulation => "typing_emulation",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitReport {
    pub mode: CommitMode,
    pub chars: usize,
    pub committed_at: DateTime<Utc>,
    pub latency_ms: u64,
    #[serde(skip)]
    started: Option<Instant>,
}

impl CommitReport {
    pub fn new(mode: CommitMode, text: &str, started: Instant) -> Self {
        Self {
            mode,
            chars: text.chars().count(),
            committed_at: Utc::now(),
            latency_ms: 0,
            started: Some(started),
        }
    }

    pub fn finish(mut self, finished: Instant) -> Self {
        if let Some(started) = self.started.take() {
            self.latency_ms = finished.saturating_duration_since(started).as_millis() as u64;
        }
        self.committed_at = Utc::now();
        self
    }
}
