//! Normalised views of incoming messages handed to handlers.

use slirc_proto::{ChannelExt, Message, ModeChange, ModeSpec, MessageParseError, split_prefix};

/// Handler arguments, shaped by command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArgs<'a> {
    /// `PRIVMSG` and `KICK`: first argument as target, the rest joined with
    /// single spaces.
    Text { target: &'a str, text: String },
    /// `JOIN` and `PART`.
    Channel { target: &'a str },
    /// `MODE`: target and the decoded changes.
    Mode {
        target: &'a str,
        changes: Vec<ModeChange>,
    },
    /// Every other command, and every fallback dispatch.
    Raw {
        command: &'a str,
        args: &'a [String],
    },
}

/// One incoming message as seen by a handler.
#[derive(Debug, Clone)]
pub struct Event<'a> {
    /// The parsed message.
    pub message: &'a Message,
    /// Sender nick, or the server name. `None` when the line had no prefix.
    pub nick: Option<&'a str>,
    /// Sender `user@host`; empty for servers, `None` when there was no prefix.
    pub userhost: Option<&'a str>,
    pub args: EventArgs<'a>,
}

impl<'a> Event<'a> {
    /// Build the event for one dispatch pass.
    ///
    /// `modes` decodes channel `MODE` changes; user mode changes are decoded
    /// with no parameterised letters. A `PRIVMSG`, `KICK`, `JOIN`, `PART` or
    /// `MODE` without a target falls back to the raw shape.
    pub fn new(
        message: &'a Message,
        fallback: bool,
        modes: &ModeSpec,
    ) -> Result<Self, MessageParseError> {
        let (nick, userhost) = match message.prefix.as_deref() {
            Some(prefix) => {
                let (nick, userhost) = split_prefix(prefix);
                (Some(nick), Some(userhost))
            }
            None => (None, None),
        };

        let raw = EventArgs::Raw {
            command: &message.command,
            args: &message.args,
        };

        let args = match (fallback, message.command.as_str(), message.args.split_first()) {
            (true, _, _) | (_, _, None) => raw,
            (false, "PRIVMSG" | "KICK", Some((target, rest))) => EventArgs::Text {
                target,
                text: rest.join(" "),
            },
            (false, "JOIN" | "PART", Some((target, _))) => EventArgs::Channel { target },
            (false, "MODE", Some((target, rest))) => {
                let changes = if target.is_channel_name() {
                    modes.parse(rest)?
                } else {
                    ModeSpec::none().parse(rest)?
                };
                EventArgs::Mode { target, changes }
            }
            (false, _, Some(_)) => raw,
        };

        Ok(Self {
            message,
            nick,
            userhost,
            args,
        })
    }

    /// The command token.
    pub fn command(&self) -> &'a str {
        &self.message.command
    }

    /// Target of a shaped event (channel or nick), if the shape has one.
    pub fn target(&self) -> Option<&'a str> {
        match self.args {
            EventArgs::Text { target, .. }
            | EventArgs::Channel { target }
            | EventArgs::Mode { target, .. } => Some(target),
            EventArgs::Raw { .. } => None,
        }
    }

    /// Text of a `PRIVMSG`/`KICK` event.
    pub fn text(&self) -> Option<&str> {
        match self.args {
            EventArgs::Text { ref text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}
