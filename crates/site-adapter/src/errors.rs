use thiserror::Error;

use aipanel_core_types::PanelError;
use dom_port::DomError;
use response_observer::ObserverError;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("input not found: {0}")]
    InputNotFound(String),
    #[error(transparent)]
    Observer(#[from] ObserverError),
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl AdapterError {
    pub fn is_retryable(&self) -> bool {
        match self {
            AdapterError::InputNotFound(_) => false,
            AdapterError::Observer(err) => err.is_retryable(),
            AdapterError::Dom(err) => err.is_retryable(),
        }
    }
}

impl From<AdapterError> for PanelError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::InputNotFound(detail) => PanelError::InputNotFound(detail),
            other => PanelError::new(other.to_string()),
        }
    }
}
