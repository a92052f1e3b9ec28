//! Channel name recognition.
//!
//! # Reference
//! - RFC 2812 Section 1.3: Channels

/// Prefix characters that introduce a channel name.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Extension trait for telling channel targets from nick targets.
pub trait ChannelExt {
    /// Whether this looks like a channel name: a channel prefix followed by
    /// no spaces, commas, or control characters, at most 50 characters.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        match chars.next() {
            Some(c) if CHANNEL_PREFIXES.contains(&c) => {}
            _ => return false,
        }

        self.chars().count() <= 50 && chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
