use std::path::PathBuf;

use aipanel_core_types::PanelError;
use extensions_bridge::BridgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error(transparent)]
    Profile(#[from] PanelError),
}

/// Why one site produced no answer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelayError {
    #[error("unknown site `{0}`")]
    UnknownSite(String),
    #[error("could not open a page: {0}")]
    Open(String),
    #[error("content script never announced readiness")]
    NotReady,
    #[error("an injection is already in flight")]
    Busy,
    #[error("injection rejected: {0}")]
    Rejected(String),
    #[error("unexpected reply: {0}")]
    Protocol(String),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl RelayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Busy | RelayError::NotReady)
    }
}

impl From<RelayError> for PanelError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::Bridge(inner) => inner.into(),
            other => PanelError::new(other.to_string()),
        }
    }
}
