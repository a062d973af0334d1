use std::sync::Arc;

use action_locator::ElementLocator;
use aipanel_core_types::SiteProfile;
use dom_port::{DomError, DomPort, ElementRef};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace};

use crate::buffer::ResponseBuffer;
use crate::config::ObserverConfig;
use crate::errors::ObserverError;
use crate::model::StreamOutcome;
use crate::stability::{Stability, StabilityTracker};

/// Captures the assistant's reply from one page.
#[derive(Clone)]
pub struct ResponseObserver {
    port: Arc<dyn DomPort>,
    container_selectors: Arc<Vec<String>>,
    message_selectors: Arc<Vec<String>>,
    config: ObserverConfig,
    buffer: ResponseBuffer,
}

impl ResponseObserver {
    pub fn new(port: Arc<dyn DomPort>, profile: &SiteProfile, config: ObserverConfig) -> Self {
        Self {
            port,
            container_selectors: Arc::new(profile.container_selectors.clone()),
            message_selectors: Arc::new(profile.message_selectors.clone()),
            config,
            buffer: ResponseBuffer::new(),
        }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub fn buffer(&self) -> &ResponseBuffer {
        &self.buffer
    }

    pub fn latest(&self) -> String {
        self.buffer.get()
    }

    /// First element any container selector matches, or `<body>`.
    pub async fn discover_container(&self) -> Result<ElementRef, ObserverError> {
        let locator = ElementLocator::new(Arc::clone(&self.port));
        match locator.first_present(&self.container_selectors).await? {
            Some(container) => {
                debug!(%container, "chat container found");
                Ok(container)
            }
            None => {
                debug!("no chat container matched, watching body");
                Ok(self.port.body().await?)
            }
        }
    }

    /// Re-extracts on every mutation that adds nodes under `container`.
    pub async fn watch(&self, container: &ElementRef) -> Result<WatchHandle, ObserverError> {
        let mut records = self.port.observe_mutations(container).await?;
        let cancel = CancellationToken::new();
        let loop_token = cancel.clone();
        let observer = self.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    record = records.recv() => match record {
                        Some(record) if record.added_nodes > 0 => {
                            if let Err(err) = observer.extract_latest().await {
                                debug!(error = %err, "extraction after mutation failed");
                            }
                        }
                        Some(_) => {}
                        None => {
                            debug!("mutation stream closed");
                            break;
                        }
                    }
                }
            }
        });
        info!(%container, "watching for reply mutations");
        Ok(WatchHandle {
            container: container.clone(),
            cancel,
            task: Some(task),
        })
    }

    /// Runs every message selector against the whole document and keeps the trimmed text of
    /// the last match. Later selectors overwrite earlier ones; empty text never overwrites.
    /// Returns whether the buffer changed.
    pub async fn extract_latest(&self) -> Result<bool, ObserverError> {
        let mut changed = false;
        for selector in self.message_selectors.iter() {
            let matches = match self.port.query_all(selector).await {
                Ok(matches) => matches,
                Err(DomError::InvalidSelector { .. }) => {
                    trace!(selector = %selector, "message selector rejected");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let Some(last) = matches.last() else {
                continue;
            };
            let text = match self.port.text_content(last).await {
                Ok(text) => text,
                Err(err) if err.is_stale() => continue,
                Err(err) => return Err(err.into()),
            };
            let text = text.trim();
            if !text.is_empty() && self.buffer.replace(text) {
                changed = true;
            }
        }
        if changed {
            trace!(chars = self.buffer.char_len(), "reply buffer updated");
        }
        Ok(changed)
    }

    /// Samples the reply length until it holds still or the ceiling passes.
    #[instrument(skip_all)]
    pub async fn track_completion(&self) -> StreamOutcome {
        let mut tracker = StabilityTracker::new(self.config.stable_samples);
        let mut ticker = interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately; sampling starts one interval in
        ticker.tick().await;

        let ceiling = sleep(self.config.ceiling());
        tokio::pin!(ceiling);
        let mut samples = 0u32;
        loop {
            tokio::select! {
                biased;
                _ = &mut ceiling => {
                    let text = self.latest();
                    info!(samples, chars = text.chars().count(), "reply tracking hit the ceiling");
                    return StreamOutcome::TimedOut { text, samples };
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.extract_latest().await {
                        debug!(error = %err, "extraction during tracking failed");
                    }
                    samples += 1;
                    if tracker.observe(self.buffer.char_len()) == Stability::Stable {
                        let text = self.latest();
                        info!(samples, chars = text.chars().count(), "reply complete");
                        return StreamOutcome::Completed { text, samples };
                    }
                }
            }
        }
    }
}

/// Running mutation watch. Dropping the handle stops it.
pub struct WatchHandle {
    container: ElementRef,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn container(&self) -> &ElementRef {
        &self.container
    }

    /// True once the task ended on its own (stream closed) or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
