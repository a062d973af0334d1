use std::fs;

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::CdpConfig;
use crate::dom::CdpDom;
use crate::errors::CdpDomError;

/// A launched Chromium plus the task pumping its DevTools connection.
pub struct ChromeSession {
    browser: Mutex<Browser>,
    cfg: CdpConfig,
    cancel: CancellationToken,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    #[instrument(skip_all, fields(headless = cfg.headless))]
    pub async fn launch(cfg: CdpConfig) -> Result<Self, CdpDomError> {
        let browser_cfg = browser_config(&cfg)?;
        let (browser, mut handler) = Browser::launch(browser_cfg)
            .await
            .map_err(|err| CdpDomError::Launch(err.to_string()))?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = handler.next() => match event {
                        Some(Ok(())) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "devtools handler stopped");
                            break;
                        }
                        None => break,
                    }
                }
            }
            debug!("devtools handler exited");
        });

        info!(executable = %cfg.executable.display(), "chromium launched");
        Ok(Self {
            browser: Mutex::new(browser),
            cfg,
            cancel,
            handler: Some(task),
        })
    }

    pub fn config(&self) -> &CdpConfig {
        &self.cfg
    }

    /// Opens `url` in a new tab and wraps it as a [`CdpDom`].
    #[instrument(skip(self))]
    pub async fn open(&self, url: &str) -> Result<CdpDom, CdpDomError> {
        let page = self.browser.lock().await.new_page(url).await?;
        debug!("page opened");
        Ok(CdpDom::new(page, self.cfg.poll_interval()))
    }

    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.lock().await.close().await {
            debug!(error = %err, "browser close failed");
        }
        self.cancel.cancel();
        if let Some(task) = self.handler.take() {
            if let Err(err) = task.await {
                debug!(error = %err, "handler task join failed");
            }
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.handler.take() {
            task.abort();
        }
    }
}

fn browser_config(cfg: &CdpConfig) -> Result<BrowserConfig, CdpDomError> {
    if !cfg.executable.as_os_str().is_empty() && !cfg.executable.exists() {
        return Err(CdpDomError::Config(format!(
            "chrome executable not found at {} (set AIPANEL_CHROME)",
            cfg.executable.display()
        )));
    }

    let profile_dir = cfg
        .resolved_profile_dir()
        .map_err(|err| CdpDomError::Config(format!("user-data-dir: {err}")))?;
    fs::create_dir_all(&profile_dir)
        .map_err(|err| CdpDomError::Config(format!("user-data-dir: {err}")))?;

    let mut builder = BrowserConfig::builder()
        .request_timeout(cfg.request_timeout())
        .launch_timeout(cfg.launch_timeout())
        .window_size(cfg.window_width, cfg.window_height)
        .args(cfg.launch_args())
        .user_data_dir(profile_dir);
    if !cfg.headless {
        builder = builder.with_head();
    }
    if cfg.no_sandbox {
        builder = builder.no_sandbox();
    }
    if !cfg.executable.as_os_str().is_empty() {
        builder = builder.chrome_executable(cfg.executable.clone());
    }
    builder.build().map_err(CdpDomError::Config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_executable_is_a_config_error() {
        let cfg = CdpConfig {
            executable: PathBuf::from("/definitely/not/here/chrome"),
            ..CdpConfig::default()
        };
        let err = browser_config(&cfg).unwrap_err();
        assert!(matches!(err, CdpDomError::Config(ref msg) if msg.contains("AIPANEL_CHROME")));
    }
}
