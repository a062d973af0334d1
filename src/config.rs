//! Application configuration.
//!
//! Loaded from YAML; every section falls back to its defaults when absent.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use aipanel_core_types::{SiteId, SiteProfile};
use cdp_adapter::CdpConfig;
use serde::{Deserialize, Serialize};
use site_adapter::{AdapterConfig, ProfileRegistry};
use tokio::fs;
use tracing::{info, warn};

use crate::errors::ConfigError;

/// Checked before the per-user configuration directory.
pub const LOCAL_CONFIG_PATH: &str = "config/aipanel.yaml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub browser: CdpConfig,
    pub timings: AdapterConfig,
    /// Custom profiles. An entry whose id matches a built-in replaces it.
    pub sites: Vec<SiteProfile>,
    /// Start URL per site id.
    pub urls: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            browser: CdpConfig::default(),
            timings: AdapterConfig::default(),
            sites: Vec::new(),
            urls: builtin_urls(),
        }
    }
}

pub fn builtin_urls() -> BTreeMap<String, String> {
    [
        ("deepseek", "https://chat.deepseek.com/"),
        ("kimi", "https://kimi.moonshot.cn/"),
        ("qwen", "https://tongyi.aliyun.com/qianwen/"),
        ("chatglm", "https://chatglm.cn/"),
    ]
    .into_iter()
    .map(|(site, url)| (site.to_string(), url.to_string()))
    .collect()
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    /// Built-in profiles with the configured custom ones registered on top.
    pub fn registry(&self) -> Result<ProfileRegistry, ConfigError> {
        let registry = ProfileRegistry::with_builtins();
        for profile in &self.sites {
            if let Some(previous) = registry.register(profile.clone())? {
                info!(site = %previous.site, "built-in profile replaced by configuration");
            }
        }
        Ok(registry)
    }

    /// Configured start URL, else the built-in one.
    pub fn start_url(&self, site: &SiteId) -> Option<String> {
        self.urls
            .get(site.as_str())
            .cloned()
            .or_else(|| builtin_urls().remove(site.as_str()))
    }
}

/// Configuration plus where it came from.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub from_file: bool,
}

/// `explicit`, else `config/aipanel.yaml` when present, else `<config dir>/aipanel/config.yaml`.
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(LOCAL_CONFIG_PATH);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(mut dir) => {
            dir.push("aipanel");
            dir.push("config.yaml");
            dir
        }
        None => local,
    }
}

pub async fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = resolve_path(explicit);
    let exists = fs::try_exists(&path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
    if !exists {
        warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(LoadedConfig {
            config: AppConfig::default(),
            path,
            from_file: false,
        });
    }

    let raw = fs::read_to_string(&path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
    let config = AppConfig::from_yaml(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "configuration loaded");
    Ok(LoadedConfig {
        config,
        path,
        from_file: true,
    })
}
