//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use slirc_proto::ChannelExt;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    MissingHost,
    #[error("server.port must not be 0")]
    InvalidPort,
    #[error("identity.nick is required")]
    MissingNick,
    #[error("invalid nick '{0}': no spaces, commas, or leading ':', '#', '&' or digit")]
    InvalidNick(String),
    #[error("invalid channel name '{0}'")]
    InvalidChannel(String),
    #[error("identity.mode_bits must be numeric, got '{0}'")]
    InvalidModeBits(String),
    #[error("timeouts.{0} must be at least 1 second")]
    ZeroTimeout(&'static str),
    #[error("reconnect.initial_delay_secs ({initial}) exceeds max_delay_secs ({max})")]
    BackoffRange { initial: u64, max: u64 },
    #[error("limits.max_line_len must be at least 512, got {0}")]
    LineLimitTooSmall(usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Server
    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }

    // Identity
    let identity = &config.identity;
    if identity.nick.is_empty() {
        errors.push(ValidationError::MissingNick);
    } else if !is_valid_nick(&identity.nick) {
        errors.push(ValidationError::InvalidNick(identity.nick.clone()));
    }
    if let Some(ref alt) = identity.alt_nick
        && !is_valid_nick(alt)
    {
        errors.push(ValidationError::InvalidNick(alt.clone()));
    }
    if identity.mode_bits.is_empty() || !identity.mode_bits.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::InvalidModeBits(identity.mode_bits.clone()));
    }
    for channel in &identity.channels {
        if !channel.name().is_channel_name() {
            errors.push(ValidationError::InvalidChannel(channel.name().to_string()));
        }
    }

    // Timeouts
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("read_secs"));
    }

    // Reconnect
    let reconnect = &config.reconnect;
    if reconnect.initial_delay_secs > reconnect.max_delay_secs {
        errors.push(ValidationError::BackoffRange {
            initial: reconnect.initial_delay_secs,
            max: reconnect.max_delay_secs,
        });
    }

    // Limits
    if config.limits.max_line_len < 512 {
        errors.push(ValidationError::LineLimitTooSmall(config.limits.max_line_len));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Loose nick check: enough to keep a typo from producing a broken `NICK`
/// line, without second-guessing what a given network accepts.
fn is_valid_nick(nick: &str) -> bool {
    let Some(first) = nick.chars().next() else {
        return false;
    };
    !first.is_ascii_digit()
        && !matches!(first, ':' | '#' | '&' | '-')
        && !nick
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ',' | '*' | '?' | '!' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::new("irc.example.org", 6667, "noiler");
        config.identity.channels = vec!["#chan".into()];
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.server.host = String::new();
        config.identity.nick = "1noiler".to_string();
        config.identity.channels = vec!["chan".into()];
        config.timeouts.read_secs = 0;

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::MissingHost));
        assert!(matches!(errors[1], ValidationError::InvalidNick(_)));
        assert!(matches!(errors[2], ValidationError::InvalidChannel(_)));
        assert!(matches!(errors[3], ValidationError::ZeroTimeout("read_secs")));
    }

    #[test]
    fn test_backoff_range() {
        let mut config = valid();
        config.reconnect.initial_delay_secs = 600;
        let errors = validate(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::BackoffRange {
                initial: 600,
                max: 300
            }
        ));
    }

    #[test]
    fn test_zero_backoff_is_allowed() {
        let mut config = valid();
        config.reconnect.initial_delay_secs = 0;
        config.reconnect.max_delay_secs = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_line_limit() {
        let mut config = valid();
        config.limits.max_line_len = 100;
        assert!(matches!(
            validate(&config).unwrap_err()[0],
            ValidationError::LineLimitTooSmall(100)
        ));
    }

    #[test]
    fn test_mode_bits() {
        let mut config = valid();
        config.identity.mode_bits = "+iw".to_string();
        assert!(matches!(
            validate(&config).unwrap_err()[0],
            ValidationError::InvalidModeBits(_)
        ));
    }

    #[test]
    fn test_nick_rules() {
        assert!(is_valid_nick("noiler"));
        assert!(is_valid_nick("[bot]|away"));
        assert!(is_valid_nick("bot_"));
        assert!(!is_valid_nick("9lives"));
        assert!(!is_valid_nick("#chan"));
        assert!(!is_valid_nick("two words"));
        assert!(!is_valid_nick("a,b"));
        assert!(!is_valid_nick(""));
    }
}
