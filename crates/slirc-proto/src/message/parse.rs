//! Message parsing implementation.

use std::str::FromStr;

use crate::error::{MessageParseError, ProtocolError};

use super::types::Message;

impl Message {
    /// Parse one raw line (terminator optional) into a [`Message`].
    pub fn parse(raw: &str) -> Result<Message, MessageParseError> {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let mut rest = line.trim_start_matches(' ');

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, tail) = stripped
                    .split_once(' ')
                    .ok_or(MessageParseError::MissingCommand)?;
                rest = tail.trim_start_matches(' ');
                (!prefix.is_empty()).then(|| prefix.to_owned())
            }
            None => None,
        };

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(MessageParseError::MissingCommand);
        }
        if !is_valid_command(command) {
            return Err(MessageParseError::InvalidCommand(command.to_owned()));
        }

        let mut args = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                args.push(trailing.to_owned());
                break;
            }
            match rest.split_once(' ') {
                Some((arg, tail)) => {
                    args.push(arg.to_owned());
                    rest = tail;
                }
                None => {
                    args.push(rest.to_owned());
                    break;
                }
            }
        }

        Ok(Message {
            prefix,
            command: command.to_ascii_uppercase(),
            args,
        })
    }
}

/// A command is a word of letters or exactly three digits.
fn is_valid_command(command: &str) -> bool {
    let bytes = command.as_bytes();
    bytes.iter().all(u8::is_ascii_alphabetic)
        || (bytes.len() == 3 && bytes.iter().all(u8::is_ascii_digit))
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        Message::parse(s).map_err(|cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        })
    }
}
