//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use super::validation::{ValidationError, validate};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Vec<ValidationError>),
}

/// Client engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Where to connect.
    pub server: ServerConfig,
    /// Who to be once connected, and where to go.
    pub identity: IdentityConfig,
    /// Socket timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Reconnect backoff.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Line cap and recovery timers.
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Minimal configuration for `host:port` as `nick`, everything else
    /// defaulted.
    pub fn new(host: impl Into<String>, port: u16, nick: impl Into<String>) -> Self {
        Self {
            server: ServerConfig {
                host: host.into(),
                port,
                tls: false,
                verify_cert: true,
                password: None,
            },
            identity: IdentityConfig {
                nick: nick.into(),
                alt_nick: None,
                username: None,
                realname: None,
                mode_bits: default_mode_bits(),
                channels: Vec::new(),
            },
            timeouts: TimeoutConfig::default(),
            reconnect: ReconnectConfig::default(),
            limits: LimitsConfig::default(),
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// Server address and transport security.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Hostname or address; also the TLS server name.
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upgrade the connection to TLS.
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate against the system roots. Turn off for
    /// self-signed servers.
    #[serde(default = "default_true")]
    pub verify_cert: bool,
    /// Server password, sent as `PASS` before registering.
    pub password: Option<String>,
}

/// Nick, user and channel identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Preferred nick.
    pub nick: String,
    /// Nick to fall back to while the preferred one is taken.
    pub alt_nick: Option<String>,
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Second `USER` parameter.
    #[serde(default = "default_mode_bits")]
    pub mode_bits: String,
    /// Channels joined after every successful registration.
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

impl IdentityConfig {
    /// Alternate nick, `nick_` unless configured.
    pub fn alt_nick(&self) -> String {
        match self.alt_nick {
            Some(ref alt) => alt.clone(),
            None => format!("{}_", self.nick),
        }
    }

    /// Username, defaulting to the nick.
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    /// Real name, defaulting to the nick.
    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }
}

/// A channel to join, optionally with a key.
///
/// Accepts either `"#chan"` or `{ name = "#chan", key = "secret" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ChannelConfig {
    Name(String),
    Keyed { name: String, key: Option<String> },
}

impl ChannelConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) | Self::Keyed { name, .. } => name,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Keyed { key, .. } => key.as_deref(),
        }
    }
}

impl From<&str> for ChannelConfig {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Socket timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// TCP connect (and TLS handshake) timeout.
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,
    /// Longest silence from the server before the connection is considered
    /// dead.
    #[serde(default = "default_read_secs")]
    pub read_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            read_secs: default_read_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

/// Exponential reconnect backoff.
///
/// The delay starts at `initial_delay_secs`, doubles after each failed
/// attempt up to `max_delay_secs`, and drops back to the initial delay once a
/// connection is welcomed by the server. Zero for both reconnects at once.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

/// Line cap and recovery timers.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Longest inbound line accepted, in bytes.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Delay before trying to take the preferred nick back after a
    /// collision. Zero disables the retry.
    #[serde(default = "default_nick_reclaim_secs")]
    pub nick_reclaim_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            nick_reclaim_secs: default_nick_reclaim_secs(),
        }
    }
}
