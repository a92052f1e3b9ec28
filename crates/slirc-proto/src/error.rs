//! Error types for the IRC protocol library.
//!
//! This module defines error types for framing failures, message parsing
//! failures, and mode parsing issues.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line exceeded the configured maximum length.
    ///
    /// The framer discards the offending bytes up to the next line
    /// terminator and keeps framing, so this error is never fatal.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Number of bytes seen before the line was given up on.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty (or whitespace only).
    #[error("empty message")]
    EmptyMessage,

    /// A prefix was present but nothing followed it.
    #[error("missing command")]
    MissingCommand,

    /// The command token is neither a word nor a three digit numeric.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Failed to parse mode string.
    #[error("invalid mode string: {string}")]
    InvalidModeString {
        /// The raw mode string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: ModeParseError,
    },
}

/// Errors encountered when parsing mode strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModeParseError {
    /// The mode string did not start with `+` or `-`.
    #[error("mode string must start with '+' or '-'")]
    MissingSign,

    /// A mode letter that takes a parameter had none left to consume.
    #[error("mode '{0}' requires a parameter but none was provided")]
    MissingParameter(char),
}
