//! Bot configuration: the engine sections plus `[bot]`.

use serde::Deserialize;
use slirc_client::config::validate;
use slirc_client::{Config, ConfigError};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Engine(#[from] ConfigError),
    #[error("bot.veto_secs must be at least 1 second")]
    ZeroVetoWindow,
}

/// Whole configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `[server]`, `[identity]`, `[timeouts]`, `[reconnect]`, `[limits]`.
    #[serde(flatten)]
    pub irc: Config,
    #[serde(default)]
    pub bot: BotConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, LoadError> {
        let config: AppConfig = toml::from_str(content).map_err(ConfigError::from)?;
        validate(&config.irc).map_err(ConfigError::Invalid)?;
        if config.bot.veto_secs == 0 {
            return Err(LoadError::ZeroVetoWindow);
        }
        Ok(config)
    }
}

/// `[bot]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Password for owner-only commands such as `!quit`. Unset disables them.
    pub owner_password: Option<String>,
    /// Post the title of links seen in channels.
    #[serde(default = "default_true")]
    pub url_titles: bool,
    /// Reply to `!info`.
    #[serde(default = "default_info_text")]
    pub info_text: String,
    /// How long an `!announce` can be vetoed before it goes out.
    #[serde(default = "default_veto_secs")]
    pub veto_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            owner_password: None,
            url_titles: default_true(),
            info_text: default_info_text(),
            veto_secs: default_veto_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_info_text() -> String {
    "Quotes, links and announcements, brought to you by slircbot.".to_string()
}

fn default_veto_secs() -> u64 {
    30
}
