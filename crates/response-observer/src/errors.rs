use thiserror::Error;

use action_locator::LocatorError;
use aipanel_core_types::PanelError;
use dom_port::DomError;

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Locator(#[from] LocatorError),
}

impl ObserverError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ObserverError::Dom(err) => err.is_retryable(),
            ObserverError::Locator(err) => err.is_retryable(),
        }
    }
}

impl From<ObserverError> for PanelError {
    fn from(err: ObserverError) -> Self {
        PanelError::new(err.to_string())
    }
}
