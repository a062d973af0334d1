use thiserror::Error;

use aipanel_core_types::PanelError;
use dom_port::DomError;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("no interactive ancestor for {0}")]
    NoTarget(String),
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl TriggerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TriggerError::Dom(err) if err.is_retryable())
    }
}

impl From<TriggerError> for PanelError {
    fn from(err: TriggerError) -> Self {
        PanelError::new(err.to_string())
    }
}
