use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::messages::Notice;
use crate::BridgeError;

/// Outbound side of the extension messaging runtime.
#[async_trait]
pub trait ExtensionRuntime: Send + Sync {
    /// False once the extension was reloaded or removed under the page.
    fn is_valid(&self) -> bool;

    async fn post(&self, notice: Notice) -> Result<(), BridgeError>;
}

/// In-process runtime backed by an unbounded channel.
#[derive(Clone)]
pub struct ChannelRuntime {
    valid: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelRuntime {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            valid: Arc::new(AtomicBool::new(true)),
            tx,
        };
        (runtime, rx)
    }

    /// Simulates an extension reload: every later post fails.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExtensionRuntime for ChannelRuntime {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    async fn post(&self, notice: Notice) -> Result<(), BridgeError> {
        if !self.is_valid() {
            return Err(BridgeError::ContextInvalidated);
        }
        self.tx.send(notice).map_err(|_| BridgeError::ChannelClosed)
    }
}

/// Wraps a runtime so that posting never fails the caller.
///
/// The first invalidated context latches suppression; later sends are dropped silently.
pub struct SafeSender {
    runtime: Arc<dyn ExtensionRuntime>,
    suppressed: AtomicBool,
}

impl SafeSender {
    pub fn new(runtime: Arc<dyn ExtensionRuntime>) -> Self {
        Self {
            runtime,
            suppressed: AtomicBool::new(false),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.load(Ordering::SeqCst)
    }

    /// Returns whether the notice was handed to the runtime.
    pub async fn send(&self, notice: Notice) -> bool {
        if self.is_suppressed() {
            return false;
        }
        if !self.runtime.is_valid() {
            self.suppress();
            return false;
        }
        match self.runtime.post(notice).await {
            Ok(()) => true,
            Err(BridgeError::ContextInvalidated) => {
                self.suppress();
                false
            }
            Err(err) => {
                debug!(error = %err, "notice dropped");
                false
            }
        }
    }

    fn suppress(&self) {
        if !self.suppressed.swap(true, Ordering::SeqCst) {
            debug!("extension context invalidated, suppressing further notices");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> Notice {
        Notice::ContentScriptReady {
            ai_type: "qwen".into(),
        }
    }

    #[tokio::test]
    async fn delivers_while_valid() {
        let (runtime, mut rx) = ChannelRuntime::new();
        let sender = SafeSender::new(Arc::new(runtime));
        assert!(sender.send(ready()).await);
        assert_eq!(rx.recv().await, Some(ready()));
    }

    #[tokio::test]
    async fn invalidation_latches() {
        let (runtime, mut rx) = ChannelRuntime::new();
        let sender = SafeSender::new(Arc::new(runtime.clone()));
        runtime.invalidate();
        assert!(!sender.send(ready()).await);
        assert!(sender.is_suppressed());
        assert!(!sender.send(ready()).await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_channel_is_not_fatal() {
        let (runtime, rx) = ChannelRuntime::new();
        drop(rx);
        let sender = SafeSender::new(Arc::new(runtime));
        assert!(!sender.send(ready()).await);
        assert!(!sender.is_suppressed());
    }
}
