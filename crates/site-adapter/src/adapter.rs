use std::sync::Arc;

use action_locator::ElementLocator;
use aipanel_core_types::{SessionId, SiteProfile};
use dom_port::DomPort;
use parking_lot::Mutex;
use response_observer::{ResponseObserver, StreamOutcome, WatchHandle};
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::sleep;
use tool_click::{SubmitTrigger, TriggerReport};
use tool_type_text::{CommitReport, InputCommitter};
use tracing::{debug, info, instrument, warn};

use crate::config::{AdapterConfig, AdapterTimings};
use crate::errors::AdapterError;
use crate::session::{InjectionSession, SendingFlag};
use crate::stage::{InjectionStage, StageCell};

/// Result of one `inject` call that did not fail outright.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InjectOutcome {
    /// Text committed and submit fired. `trigger` is `None` when no send control was found.
    Submitted {
        session: SessionId,
        commit: CommitReport,
        trigger: Option<TriggerReport>,
    },
    /// Another injection holds the sending flag.
    Busy,
    /// The pipeline stopped early at `stage`.
    Degraded {
        session: SessionId,
        stage: InjectionStage,
        reason: String,
    },
}

impl InjectOutcome {
    pub fn is_busy(&self) -> bool {
        matches!(self, InjectOutcome::Busy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InjectOutcome::Submitted { .. } => "submitted",
            InjectOutcome::Busy => "busy",
            InjectOutcome::Degraded { .. } => "degraded",
        }
    }
}

/// Chat adapter bound to one page and one site profile.
#[derive(Clone)]
pub struct SiteAdapter {
    inner: Arc<AdapterInner>,
}

struct AdapterInner {
    profile: Arc<SiteProfile>,
    port: Arc<dyn DomPort>,
    locator: ElementLocator,
    committer: InputCommitter,
    trigger: SubmitTrigger,
    observer: ResponseObserver,
    timings: AdapterTimings,
    sending: SendingFlag,
    stage: StageCell,
    watching: Mutex<Option<WatchHandle>>,
    completion: watch::Sender<Option<StreamOutcome>>,
}

impl SiteAdapter {
    pub fn new(profile: Arc<SiteProfile>, port: Arc<dyn DomPort>, config: AdapterConfig) -> Self {
        let (completion, _) = watch::channel(None);
        let inner = AdapterInner {
            locator: ElementLocator::new(Arc::clone(&port)),
            committer: InputCommitter::new(Arc::clone(&port), config.commit_timings()),
            trigger: SubmitTrigger::new(Arc::clone(&port), config.trigger.clone()),
            observer: ResponseObserver::new(Arc::clone(&port), &profile, config.observer.clone()),
            timings: config.adapter,
            sending: SendingFlag::new(),
            stage: StageCell::default(),
            watching: Mutex::new(None),
            completion,
            profile,
            port,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn profile(&self) -> &Arc<SiteProfile> {
        &self.inner.profile
    }

    pub fn port(&self) -> &Arc<dyn DomPort> {
        &self.inner.port
    }

    pub fn stage(&self) -> InjectionStage {
        self.inner.stage.get()
    }

    pub fn is_sending(&self) -> bool {
        self.inner.sending.is_held()
    }

    /// Latest captured reply; empty until something was extracted.
    pub fn latest_response(&self) -> String {
        self.inner.observer.latest()
    }

    /// Yields the outcome of every reply-tracking cycle, including `Abandoned` when an
    /// injection stopped before submit.
    pub fn subscribe_completion(&self) -> watch::Receiver<Option<StreamOutcome>> {
        self.inner.completion.subscribe()
    }

    /// Waits for the document to finish loading, then starts the mutation watch.
    #[instrument(skip_all, fields(site = %self.inner.profile.site))]
    pub async fn start(&self) -> Result<(), AdapterError> {
        self.inner.port.dom_content_loaded().await?;
        self.inner.ensure_watching().await?;
        Ok(())
    }

    /// Runs the injection pipeline for `text`.
    #[instrument(skip_all, fields(site = %self.inner.profile.site))]
    pub async fn inject(&self, text: &str) -> Result<InjectOutcome, AdapterError> {
        let Some(lease) = self.inner.sending.try_acquire(self.inner.timings.cooldown()) else {
            info!("injection already in flight");
            return Ok(InjectOutcome::Busy);
        };
        let session = InjectionSession::new(text, lease);
        let _idle = self.inner.stage.idle_on_drop();
        let outcome = self.run_pipeline(&session).await;
        match &outcome {
            Ok(outcome) => info!(session = %session.id.0, outcome = outcome.label(), "injection finished"),
            Err(err) => warn!(session = %session.id.0, error = %err, "injection failed"),
        }
        outcome
    }

    async fn run_pipeline(&self, session: &InjectionSession) -> Result<InjectOutcome, AdapterError> {
        let inner = &self.inner;
        let profile = &inner.profile;

        inner.stage.enter(InjectionStage::Locating);
        let input = inner
            .locator
            .locate(&profile.input_selectors)
            .await
            .map_err(|err| AdapterError::InputNotFound(err.to_string()))?;

        inner.stage.enter(InjectionStage::Committing);
        let commit = match inner
            .committer
            .commit(&input, profile.editor_kind, &session.payload)
            .await
        {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "commit failed, skipping submit");
                let reason = err.to_string();
                inner.completion.send_replace(Some(StreamOutcome::Abandoned {
                    reason: reason.clone(),
                }));
                return Ok(InjectOutcome::Degraded {
                    session: session.id.clone(),
                    stage: InjectionStage::Committing,
                    reason,
                });
            }
        };

        inner.stage.enter(InjectionStage::Settling);
        inner.committer.settle().await;

        inner.stage.enter(InjectionStage::Submitting);
        let trigger = match inner
            .locator
            .locate_with_fallback(&profile.send_selectors, profile.send_fallback.as_ref())
            .await
        {
            Ok(send) => {
                let report = inner
                    .trigger
                    .trigger(&send, profile.send_container.as_deref())
                    .await;
                inner.trigger.flag_for_manual(&report.target).await;
                Some(report)
            }
            Err(err) => {
                warn!(error = %err, "send control not found, waiting for a manual submit");
                None
            }
        };

        inner.stage.enter(InjectionStage::ArmingObserver);
        self.arm_observer();

        Ok(InjectOutcome::Submitted {
            session: session.id.clone(),
            commit,
            trigger,
        })
    }

    /// Starts reply tracking after the observe delay, without waiting for it.
    fn arm_observer(&self) {
        let inner = Arc::clone(&self.inner);
        let delay = inner.timings.observe_delay();
        tokio::spawn(async move {
            sleep(delay).await;
            if let Err(err) = inner.ensure_watching().await {
                debug!(error = %err, "mutation watch unavailable, relying on polling");
            }
            let outcome = inner.observer.track_completion().await;
            inner.completion.send_replace(Some(outcome));
        });
    }
}

impl AdapterInner {
    async fn ensure_watching(&self) -> Result<(), AdapterError> {
        let active = self
            .watching
            .lock()
            .as_ref()
            .map_or(false, |handle| !handle.is_finished());
        if active {
            return Ok(());
        }
        let container = self.observer.discover_container().await?;
        let handle = self.observer.watch(&container).await?;
        self.watching.lock().replace(handle);
        Ok(())
    }
}
