//! Default value functions for configuration.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_port() -> u16 {
    6667
}

pub fn default_true() -> bool {
    true
}

// =============================================================================
// Identity Defaults
// =============================================================================

/// `USER` mode bits; 12 asks for +iw.
pub fn default_mode_bits() -> String {
    "12".to_string()
}

// =============================================================================
// Timeout Defaults
// =============================================================================

pub fn default_connect_secs() -> u64 {
    30
}

pub fn default_read_secs() -> u64 {
    300
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_initial_delay_secs() -> u64 {
    5
}

pub fn default_max_delay_secs() -> u64 {
    300
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    slirc_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_nick_reclaim_secs() -> u64 {
    30
}
