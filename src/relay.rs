//! Fan-out of one question across several chat sites.
//!
//! Each site gets its own page, [`SiteAdapter`] and [`ContentScriptHost`]; the relay talks to
//! the host only through the messaging contract, exactly as an extension background would.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aipanel_core_types::{SiteId, SiteProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dom_port::DomPort;
use extensions_bridge::{ChannelRuntime, ContentScriptHost, HostClient, InjectReply, LatestReply, Notice};
use futures::future::join_all;
use response_observer::StreamOutcome;
use serde::{Deserialize, Serialize};
use serde_json::json;
use site_adapter::{AdapterConfig, ProfileRegistry, SiteAdapter};
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::config::AppConfig;
use crate::errors::{ConfigError, RelayError};

/// Opens one page per site.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open(
        &self,
        profile: &SiteProfile,
        url: Option<&str>,
    ) -> Result<Arc<dyn DomPort>, RelayError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Reply stopped growing.
    Completed,
    /// Reply still growing at the ceiling.
    TimedOut,
    /// No tracking outcome arrived before the relay gave up waiting.
    Unfinished,
    Failed,
}

impl AnswerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerStatus::Completed => "completed",
            AnswerStatus::TimedOut => "timed out",
            AnswerStatus::Unfinished => "unfinished",
            AnswerStatus::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteAnswer {
    pub site: SiteId,
    pub display_name: String,
    pub status: AnswerStatus,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl SiteAnswer {
    fn failed(site: &SiteId, display_name: String, err: &RelayError, started: Instant) -> Self {
        Self {
            site: site.clone(),
            display_name,
            status: AnswerStatus::Failed,
            text: String::new(),
            samples: None,
            error: Some(err.to_string()),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Cross-reference report: the same question answered by every requested site.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayReport {
    pub question: String,
    pub asked_at: DateTime<Utc>,
    pub answers: Vec<SiteAnswer>,
}

impl RelayReport {
    pub fn answer(&self, site: &str) -> Option<&SiteAnswer> {
        self.answers.iter().find(|a| a.site.as_str() == site)
    }

    pub fn completed(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.status == AnswerStatus::Completed)
            .count()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Question: {}", self.question);
        let _ = writeln!(
            out,
            "Asked at {} ({} of {} completed)",
            self.asked_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.completed(),
            self.answers.len()
        );
        for answer in &self.answers {
            let name = if answer.display_name.is_empty() {
                answer.site.as_str()
            } else {
                answer.display_name.as_str()
            };
            let _ = writeln!(
                out,
                "\n== {name} ({}) [{}, {:.1}s]",
                answer.site,
                answer.status.as_str(),
                answer.elapsed_ms as f64 / 1000.0
            );
            match &answer.error {
                Some(error) => {
                    let _ = writeln!(out, "error: {error}");
                }
                None if answer.text.is_empty() => {
                    let _ = writeln!(out, "(no reply captured)");
                }
                None => {
                    let _ = writeln!(out, "{}", answer.text);
                }
            }
        }
        out
    }
}

pub struct Relay {
    registry: Arc<ProfileRegistry>,
    timings: AdapterConfig,
    urls: BTreeMap<String, String>,
    factory: Arc<dyn PageFactory>,
    ready_timeout: Duration,
    reply_slack: Duration,
}

impl Relay {
    pub fn new(
        registry: Arc<ProfileRegistry>,
        timings: AdapterConfig,
        factory: Arc<dyn PageFactory>,
    ) -> Self {
        Self {
            registry,
            timings,
            urls: BTreeMap::new(),
            factory,
            ready_timeout: Duration::from_secs(30),
            reply_slack: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &AppConfig, factory: Arc<dyn PageFactory>) -> Result<Self, ConfigError> {
        let registry = Arc::new(config.registry()?);
        let urls = registry
            .ids()
            .into_iter()
            .filter_map(|site| config.start_url(&site).map(|url| (site.0, url)))
            .collect();
        Ok(Self::new(registry, config.timings.clone(), factory).with_urls(urls))
    }

    pub fn with_urls(mut self, urls: BTreeMap<String, String>) -> Self {
        self.urls = urls;
        self
    }

    pub fn with_ready_timeout(mut self, ready_timeout: Duration) -> Self {
        self.ready_timeout = ready_timeout;
        self
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Asks every site concurrently; answers keep the order of `sites`.
    #[instrument(skip_all, fields(sites = sites.len()))]
    pub async fn ask(&self, question: &str, sites: &[SiteId]) -> RelayReport {
        let asked_at = Utc::now();
        let answers = join_all(sites.iter().map(|site| self.ask_one(question, site))).await;
        let report = RelayReport {
            question: question.to_string(),
            asked_at,
            answers,
        };
        info!(completed = report.completed(), "relay finished");
        report
    }

    #[instrument(skip(self, question), fields(site = %site))]
    async fn ask_one(&self, question: &str, site: &SiteId) -> SiteAnswer {
        let started = Instant::now();
        let display_name = self
            .registry
            .get(site)
            .map(|p| p.display_name.clone())
            .unwrap_or_default();
        match self.drive(question, site, started).await {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "site produced no answer");
                SiteAnswer::failed(site, display_name, &err, started)
            }
        }
    }

    async fn drive(
        &self,
        question: &str,
        site: &SiteId,
        started: Instant,
    ) -> Result<SiteAnswer, RelayError> {
        let profile = self
            .registry
            .get(site)
            .ok_or_else(|| RelayError::UnknownSite(site.to_string()))?;
        let url = self.urls.get(site.as_str()).map(String::as_str);
        let port = self.factory.open(&profile, url).await?;

        let adapter = SiteAdapter::new(Arc::clone(&profile), port, self.timings.clone());
        let mut completion = adapter.subscribe_completion();
        let (runtime, mut notices) = ChannelRuntime::new();
        let host = ContentScriptHost::new(adapter, Arc::new(runtime));
        let (client, requests) = HostClient::channel(8);
        tokio::spawn(host.clone().serve(requests));

        match timeout(self.ready_timeout, host.start()).await {
            Ok(result) => result?,
            Err(_) => return Err(RelayError::NotReady),
        }
        match notices.try_recv() {
            Ok(Notice::ContentScriptReady { .. }) => {}
            Err(_) => return Err(RelayError::NotReady),
        }

        let reply = client
            .request(json!({"type": "INJECT_MESSAGE", "message": question}))
            .await?
            .ok_or_else(|| RelayError::Protocol("no reply to INJECT_MESSAGE".into()))?;
        let reply: InjectReply =
            serde_json::from_value(reply).map_err(|err| RelayError::Protocol(err.to_string()))?;
        if !reply.success {
            return Err(reply.error.map_or(RelayError::Busy, RelayError::Rejected));
        }

        let wait = self.timings.adapter.observe_delay() + self.timings.observer.ceiling() + self.reply_slack;
        let outcome: Option<StreamOutcome> =
            match timeout(wait, completion.wait_for(Option::is_some)).await {
                Ok(Ok(outcome)) => outcome.clone(),
                _ => None,
            };

        let latest = client
            .request(json!({"type": "GET_LATEST_RESPONSE"}))
            .await?
            .ok_or_else(|| RelayError::Protocol("no reply to GET_LATEST_RESPONSE".into()))?;
        let latest: LatestReply =
            serde_json::from_value(latest).map_err(|err| RelayError::Protocol(err.to_string()))?;

        let (status, error) = match &outcome {
            Some(StreamOutcome::Completed { .. }) => (AnswerStatus::Completed, None),
            Some(StreamOutcome::TimedOut { .. }) => (AnswerStatus::TimedOut, None),
            Some(StreamOutcome::Abandoned { reason }) => {
                warn!(reason = %reason, "message was not submitted");
                (AnswerStatus::Failed, Some(format!("not submitted: {reason}")))
            }
            None => (AnswerStatus::Unfinished, None),
        };
        Ok(SiteAnswer {
            site: site.clone(),
            display_name: profile.display_name.clone(),
            status,
            text: latest.content,
            samples: outcome
                .as_ref()
                .filter(|outcome| !matches!(outcome, StreamOutcome::Abandoned { .. }))
                .map(StreamOutcome::samples),
            error,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }
}
