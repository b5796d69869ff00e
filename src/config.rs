use anyhow::{Context, Result};
use icsrelay_core::{CleanRules, UrlPolicy};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analytics::AnalyticsConfig;

/// Relay configuration, read from ~/.config/icsrelay/config.toml
///
/// Every field has a default, so an empty or missing file yields a relay
/// for the FH Münster timetable export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server binds to
    pub listen: SocketAddr,

    /// Timeout for the whole upstream fetch, in seconds
    pub fetch_timeout_secs: u64,

    /// File name offered in the Content-Disposition header
    pub attachment_filename: String,

    pub user_agent: String,

    /// Example export URL; overrides `[policy]` when set
    pub allowed_url: Option<String>,

    pub policy: UrlPolicy,

    pub rules: CleanRules,

    pub analytics: AnalyticsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: SocketAddr::from(([127, 0, 0, 1], 8000)),
            fetch_timeout_secs: 10,
            attachment_filename: "CleanedCalendar.ics".to_string(),
            user_agent: format!("icsrelay/{}", env!("CARGO_PKG_VERSION")),
            allowed_url: None,
            policy: UrlPolicy::default(),
            rules: CleanRules::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Config {
    /// Get the default config file path (~/.config/icsrelay/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("icsrelay").join("config.toml"))
    }

    /// Load from an explicit path, or from the default path if it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// The allow-list in effect, taking `allowed_url` into account.
    pub fn url_policy(&self) -> Result<UrlPolicy> {
        match &self.allowed_url {
            Some(template) => UrlPolicy::from_template(template)
                .with_context(|| format!("allowed_url is not an absolute URL: {}", template)),
            None => Ok(self.policy.clone()),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
