//! Tracing helpers for wire logging and span construction.

use tracing::debug;

/// Log one line crossing the wire.
#[inline]
pub fn wire(direction: &'static str, line: &str) {
    debug!(direction, line = %line, "wire");
}

/// Standardized span constructors for client observability.
pub mod spans {
    use tracing::{Span, debug_span, info_span};

    /// Create a span for one connection attempt.
    pub fn session(host: &str, port: u16, attempt: u64) -> Span {
        info_span!("session", host = %host, port = port, attempt = attempt)
    }

    /// Create a span for one dispatch pass.
    pub fn dispatch(command: &str, fallback: bool) -> Span {
        debug_span!("dispatch", command = %command, fallback = fallback)
    }

    /// Create a span for a fired deferred action.
    pub fn deferred(slot: &str) -> Span {
        debug_span!("deferred", slot = %slot)
    }
}
