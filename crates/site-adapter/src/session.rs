use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aipanel_core_types::SessionId;
use tokio::runtime::Handle;
use tracing::debug;

/// The adapter's `sending` flag. At most one lease exists at a time.
#[derive(Clone, Debug, Default)]
pub struct SendingFlag {
    held: Arc<AtomicBool>,
}

impl SendingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Takes the flag, or `None` while another injection (or its cooldown) holds it.
    pub fn try_acquire(&self, cooldown: Duration) -> Option<SendingLease> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendingLease {
                held: Arc::clone(&self.held),
                cooldown,
            })
    }
}

/// Releases the flag `cooldown` after it is dropped.
#[derive(Debug)]
pub struct SendingLease {
    held: Arc<AtomicBool>,
    cooldown: Duration,
}

impl Drop for SendingLease {
    fn drop(&mut self) {
        let held = Arc::clone(&self.held);
        match Handle::try_current() {
            Ok(handle) => {
                let cooldown = self.cooldown;
                handle.spawn(async move {
                    tokio::time::sleep(cooldown).await;
                    held.store(false, Ordering::Release);
                    debug!("sending flag released");
                });
            }
            Err(_) => held.store(false, Ordering::Release),
        }
    }
}

/// One in-flight injection.
#[derive(Debug)]
pub struct InjectionSession {
    pub id: SessionId,
    pub payload: String,
    _lease: SendingLease,
}

impl InjectionSession {
    pub fn new(payload: impl Into<String>, lease: SendingLease) -> Self {
        Self {
            id: SessionId::new(),
            payload: payload.into(),
            _lease: lease,
        }
    }
}
