use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use which::which;

/// Launch and tuning options for the Chromium session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdpConfig {
    /// Empty means "let chromiumoxide pick".
    pub executable: PathBuf,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    pub no_sandbox: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub extra_args: Vec<String>,
    pub request_timeout_ms: u64,
    pub launch_timeout_ms: u64,
    /// How often observed mutation counters and the ready state are polled.
    pub poll_interval_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            executable: detect_chrome_executable().unwrap_or_default(),
            user_data_dir: default_profile_dir(),
            headless: env_flag("AIPANEL_HEADLESS").unwrap_or(true),
            no_sandbox: env_flag("AIPANEL_DISABLE_SANDBOX").unwrap_or(false),
            window_width: 1280,
            window_height: 900,
            extra_args: Vec::new(),
            request_timeout_ms: 30_000,
            launch_timeout_ms: 20_000,
            poll_interval_ms: 100,
        }
    }
}

impl CdpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }

    /// `user_data_dir` resolved against the working directory.
    pub fn resolved_profile_dir(&self) -> std::io::Result<PathBuf> {
        if self.user_data_dir.is_absolute() {
            Ok(self.user_data_dir.clone())
        } else {
            Ok(env::current_dir()?.join(&self.user_data_dir))
        }
    }

    /// Command-line switches passed to Chromium on top of chromiumoxide's own.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "--disable-background-timer-throttling",
            "--disable-backgrounding-occluded-windows",
            "--disable-renderer-backgrounding",
            "--disable-dev-shm-usage",
            "--no-first-run",
            "--no-default-browser-check",
            "--password-store=basic",
            "--use-mock-keychain",
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
        if self.headless {
            args.push("--headless=new".to_string());
            args.push("--mute-audio".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    let lower = value.trim().to_ascii_lowercase();
    match lower.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn default_profile_dir() -> PathBuf {
    if let Ok(path) = env::var("AIPANEL_CHROME_PROFILE") {
        if !path.trim().is_empty() {
            return PathBuf::from(path.trim());
        }
    }
    Path::new("./.aipanel-profile").into()
}

/// `AIPANEL_CHROME`, then `PATH`, then well-known install locations.
pub fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("AIPANEL_CHROME") {
        let candidate = PathBuf::from(raw.trim());
        if !raw.trim().is_empty() && candidate.exists() {
            return Some(candidate);
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_specific_chrome_paths()
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|var| env::var_os(var).map(PathBuf::from))
            .flat_map(|root| {
                [
                    root.join("Google/Chrome/Application/chrome.exe"),
                    root.join("Chromium/Application/chrome.exe"),
                    root.join("Microsoft/Edge/Application/msedge.exe"),
                ]
            })
            .collect()
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_args_include_new_mode() {
        let cfg = CdpConfig {
            headless: true,
            extra_args: vec!["--lang=zh-CN".into()],
            ..CdpConfig::default()
        };
        let args = cfg.launch_args();
        assert!(args.contains(&"--headless=new".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("--lang=zh-CN"));

        let headful = CdpConfig {
            headless: false,
            ..cfg
        };
        assert!(!headful.launch_args().iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn relative_profile_dir_is_anchored_to_cwd() {
        let cfg = CdpConfig {
            user_data_dir: PathBuf::from("profiles/chat"),
            ..CdpConfig::default()
        };
        let resolved = cfg.resolved_profile_dir().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("profiles/chat"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: CdpConfig = serde_json::from_str(r#"{"headless": false, "window_width": 800}"#)
            .unwrap();
        assert!(!cfg.headless);
        assert_eq!(cfg.window_width, 800);
        assert_eq!(cfg.window_height, 900);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn explicit_chrome_env_wins() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("chrome");
        std::fs::write(&fake, b"").unwrap();
        env::set_var("AIPANEL_CHROME", &fake);
        let detected = detect_chrome_executable();
        env::remove_var("AIPANEL_CHROME");
        assert_eq!(detected, Some(fake));
    }
}
