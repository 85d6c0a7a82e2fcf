use crate::state::calendar::Projection;
use log::{LevelFilter, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub api_url: String,
    pub account_id: String,
    pub token: Option<String>,
    pub roles: Vec<String>,
    pub full_screen: bool,
    #[serde(deserialize_with = "level_filter")]
    pub log_level: Option<LevelFilter>,
    /// Seconds between background reloads of the visible window; 0 disables.
    pub refresh_secs: u64,
    pub default_view: Projection,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            account_id: String::new(),
            token: None,
            roles: Vec::new(),
            full_screen: false,
            log_level: None,
            refresh_secs: 60,
            default_view: Projection::Month,
        }
    }
}

impl AppSettings {
    /// Defaults, then `config.toml`, then `DRACO_*` environment variables.
    pub fn load() -> Self {
        let path = config_dir().join("config.toml");
        let mut settings = Self::from_file(&path).unwrap_or_else(|e| {
            if path.exists() {
                warn!("ignoring {}: {e}", path.display());
            }
            Self::default()
        });
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("invalid config: {e}"))
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("DRACO_API_URL") {
            self.api_url = url;
        }
        if let Some(account) = var("DRACO_ACCOUNT_ID") {
            self.account_id = account;
        }
        if let Some(token) = var("DRACO_TOKEN") {
            self.token = Some(token);
        }
        if let Some(roles) = var("DRACO_ROLES") {
            self.roles = roles
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(level) = var("DRACO_LOG").and_then(|l| LevelFilter::from_str(l.trim()).ok()) {
            self.log_level = Some(level);
        }
    }
}

/// `$XDG_CONFIG_HOME/draco`, `~/.config/draco`, or the working directory.
pub fn config_dir() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("draco");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home).join(".config").join("draco");
    }
    PathBuf::from(".")
}

fn level_filter<'de, D>(deserializer: D) -> Result<Option<LevelFilter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|s| LevelFilter::from_str(s.trim()).map_err(serde::de::Error::custom))
        .transpose()
}
