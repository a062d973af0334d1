//! Error types for locator system

use dom_port::DomError;
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// No visible element matched any selector or keyword matcher
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Page access error
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}

impl LocatorError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            LocatorError::Dom(err) => err.is_retryable(),
            LocatorError::ElementNotFound(_) => false,
        }
    }
}
