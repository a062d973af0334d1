//! Messaging contract between an extension background and the content-script host.
//!
//! The background sends `INJECT_MESSAGE` and `GET_LATEST_RESPONSE` requests; the host
//! answers through a reply channel and announces itself with `CONTENT_SCRIPT_READY`.

mod host;
mod messages;
mod runtime;

pub use host::{ContentScriptHost, HostClient, HostRequest};
pub use messages::{InjectReply, LatestReply, Notice, Reply, Request};
pub use runtime::{ChannelRuntime, ExtensionRuntime, SafeSender};

use aipanel_core_types::PanelError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("extension context invalidated")]
    ContextInvalidated,
    #[error("channel closed")]
    ChannelClosed,
    #[error("malformed message: {0}")]
    Malformed(String),
}

impl From<BridgeError> for PanelError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::ContextInvalidated => PanelError::ContextInvalidated,
            other => PanelError::new(other.to_string()),
        }
    }
}
