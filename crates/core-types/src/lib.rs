use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

mod profile;

pub use profile::{AttributeKeyword, EditorKind, KeywordFallback, SiteProfile, SiteProfileBuilder};

/// Shared error type for the adapter crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PanelError {
    #[error("input not found: {0}")]
    InputNotFound(String),
    #[error("extension context invalidated")]
    ContextInvalidated,
    #[error("invalid site profile `{site}`: {reason}")]
    InvalidProfile { site: String, reason: String },
    #[error("{message}")]
    Message { message: String },
}

impl PanelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Identifier of a supported chat site (`deepseek`, `kimi`, ...).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub String);

impl SiteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SiteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier of one injection pipeline run.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
