//! Engine configuration.
//!
//! Loaded from TOML, then checked with [`validate`] so every problem is
//! reported at once instead of one per restart.

mod defaults;
mod types;
mod validation;

pub use types::{
    ChannelConfig, Config, ConfigError, IdentityConfig, LimitsConfig, ReconnectConfig,
    ServerConfig, TimeoutConfig,
};
pub use validation::{ValidationError, validate};
