use std::sync::Arc;
use std::time::Duration;

use aipanel_cli::{PageFactory, Relay, RelayError};
use aipanel_core_types::{SiteId, SiteProfile};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use cdp_adapter::ChromeSession;
use clap::Args;
use dom_port::DomPort;
use tracing::info;

use super::context::CliContext;
use super::output::emit;

#[derive(Args, Clone, Debug)]
pub struct AskArgs {
    /// Question to send to every site
    pub text: String,

    /// Site id to ask (repeatable); every registered site when omitted
    #[arg(short, long = "site", value_name = "ID")]
    pub sites: Vec<String>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Seconds to wait for each page to become ready
    #[arg(long, default_value_t = 30)]
    pub ready_timeout: u64,
}

/// Opens each site in a tab of one shared Chromium.
struct ChromePages {
    session: Arc<ChromeSession>,
}

#[async_trait]
impl PageFactory for ChromePages {
    async fn open(
        &self,
        profile: &SiteProfile,
        url: Option<&str>,
    ) -> Result<Arc<dyn DomPort>, RelayError> {
        let url = url.ok_or_else(|| {
            RelayError::Open(format!("no start URL configured for `{}`", profile.site))
        })?;
        let dom = self
            .session
            .open(url)
            .await
            .map_err(|err| RelayError::Open(err.to_string()))?;
        Ok(Arc::new(dom))
    }
}

pub async fn cmd_ask(args: AskArgs, ctx: &CliContext) -> Result<()> {
    if args.text.trim().is_empty() {
        bail!("question is empty");
    }

    let mut browser = ctx.config().browser.clone();
    if args.headful {
        browser.headless = false;
    }
    let session = Arc::new(
        ChromeSession::launch(browser)
            .await
            .context("launching chromium")?,
    );

    let factory = Arc::new(ChromePages {
        session: Arc::clone(&session),
    });
    let relay = Relay::from_config(ctx.config(), factory)?
        .with_ready_timeout(Duration::from_secs(args.ready_timeout));

    let sites: Vec<SiteId> = if args.sites.is_empty() {
        relay.registry().ids()
    } else {
        args.sites.iter().map(|s| SiteId::new(s.as_str())).collect()
    };
    info!(sites = sites.len(), "asking");

    let report = relay.ask(&args.text, &sites).await;
    drop(relay);
    emit(ctx.output(), &report, || report.render_text())?;

    if let Ok(session) = Arc::try_unwrap(session) {
        session.shutdown().await;
    }
    Ok(())
}
