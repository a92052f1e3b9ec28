//! Error types for the client engine.
//!
//! Transport failures never reach the caller of [`Client::connect`]; they are
//! logged and turned into a reconnect. They are public so the session span
//! can record them and so tests can match on them.
//!
//! [`Client::connect`]: crate::Client::connect

use std::time::Duration;

use slirc_proto::ProtocolError;
use thiserror::Error;

/// Everything that ends one connection attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out connecting to {addr} after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("TLS handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("no data from server for {0:?}")]
    ReadTimeout(Duration),

    #[error("connection closed by server")]
    Closed,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("write failed: {0}")]
    Write(#[from] ProtocolError),
}

impl TransportError {
    /// Get a static error code string for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::ConnectTimeout { .. } => "connect_timeout",
            Self::InvalidServerName(_) => "invalid_server_name",
            Self::Tls(_) => "tls",
            Self::ReadTimeout(_) => "read_timeout",
            Self::Closed => "closed",
            Self::Io(_) => "io",
            Self::Write(_) => "write",
        }
    }
}

/// A deferred action is already pending in the requested slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slot '{slot}' already has a pending action")]
pub struct SchedulerBusy {
    pub slot: String,
}
