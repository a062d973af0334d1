use thiserror::Error;

use aipanel_core_types::PanelError;
use dom_port::DomError;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("element {0} does not accept text")]
    NotEditable(String),
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl CommitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CommitError::Dom(err) if err.is_retryable())
    }
}

impl From<CommitError> for PanelError {
    fn from(err: CommitError) -> Self {
        PanelError::new(err.to_string())
    }
}
