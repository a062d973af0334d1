use std::sync::Arc;

use serde_json::Value;
use site_adapter::{InjectOutcome, SiteAdapter};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::messages::{InjectReply, LatestReply, Notice, Reply, Request};
use crate::runtime::{ExtensionRuntime, SafeSender};
use crate::BridgeError;

/// One inbound envelope together with its reply slot.
///
/// Dropping `reply` without sending means the request is ignored.
pub struct HostRequest {
    pub message: Value,
    pub reply: oneshot::Sender<Value>,
}

/// Background-side handle for talking to a served host.
#[derive(Clone)]
pub struct HostClient {
    tx: mpsc::Sender<HostRequest>,
}

impl HostClient {
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<HostRequest>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    /// Sends `message` and waits for the reply. `None` when the host ignored it.
    pub async fn request(&self, message: Value) -> Result<Option<Value>, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(HostRequest { message, reply })
            .await
            .map_err(|_| BridgeError::ChannelClosed)?;
        Ok(rx.await.ok())
    }
}

/// Content-script side: routes background requests to one [`SiteAdapter`].
#[derive(Clone)]
pub struct ContentScriptHost {
    adapter: SiteAdapter,
    sender: Arc<SafeSender>,
}

impl ContentScriptHost {
    pub fn new(adapter: SiteAdapter, runtime: Arc<dyn ExtensionRuntime>) -> Self {
        Self {
            adapter,
            sender: Arc::new(SafeSender::new(runtime)),
        }
    }

    pub fn adapter(&self) -> &SiteAdapter {
        &self.adapter
    }

    pub fn sender(&self) -> &SafeSender {
        &self.sender
    }

    pub async fn announce_ready(&self) -> bool {
        let ai_type = self.adapter.profile().site.to_string();
        self.sender.send(Notice::ContentScriptReady { ai_type }).await
    }

    /// Announces readiness, starts the adapter, and announces again if the page was
    /// still loading at startup.
    #[instrument(skip_all, fields(site = %self.adapter.profile().site))]
    pub async fn start(&self) -> Result<(), BridgeError> {
        let was_loading = match self.adapter.port().ready_state().await {
            Ok(state) => state.is_loading(),
            Err(err) => {
                debug!(error = %err, "ready state unavailable");
                false
            }
        };
        self.announce_ready().await;
        if let Err(err) = self.adapter.start().await {
            warn!(error = %err, "reply watch not started");
        }
        if was_loading {
            self.announce_ready().await;
        }
        info!("content script ready");
        Ok(())
    }

    pub async fn handle(&self, request: Request) -> Reply {
        match request {
            Request::InjectMessage { message } => Reply::Inject(self.inject(&message).await),
            Request::GetLatestResponse => Reply::Latest(LatestReply {
                content: self.adapter.latest_response(),
            }),
        }
    }

    /// Handles a raw envelope. `None` means no reply is sent.
    pub async fn handle_value(&self, message: Value) -> Option<Value> {
        match Request::from_value(message) {
            Ok(Some(request)) => {
                debug!(kind = request.kind(), "request received");
                Some(self.handle(request).await.to_value())
            }
            Ok(None) => {
                debug!("ignoring untyped or unknown request");
                None
            }
            Err(err) => {
                warn!(error = %err, "rejecting malformed request");
                Some(Reply::Inject(InjectReply::failed(err.to_string())).to_value())
            }
        }
    }

    /// Serves requests until every [`HostClient`] is dropped. Each request runs in its own task.
    pub async fn serve(self, mut rx: mpsc::Receiver<HostRequest>) {
        while let Some(HostRequest { message, reply }) = rx.recv().await {
            let host = self.clone();
            tokio::spawn(async move {
                if let Some(value) = host.handle_value(message).await {
                    if reply.send(value).is_err() {
                        debug!("requester went away before the reply");
                    }
                }
            });
        }
    }

    async fn inject(&self, message: &str) -> InjectReply {
        match self.adapter.inject(message).await {
            Ok(InjectOutcome::Busy) => InjectReply::busy(),
            Ok(InjectOutcome::Submitted { .. }) | Ok(InjectOutcome::Degraded { .. }) => {
                InjectReply::ok()
            }
            Err(err) => InjectReply::failed(err.to_string()),
        }
    }
}
