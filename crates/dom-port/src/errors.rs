use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomError {
    #[error("selector `{selector}` rejected: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("element {0} is no longer attached to the document")]
    StaleElement(String),
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("page script failed: {0}")]
    Script(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

impl DomError {
    pub fn is_stale(&self) -> bool {
        matches!(self, DomError::StaleElement(_))
    }

    /// Transport hiccups may succeed on a second attempt; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomError::Transport(_))
    }
}
