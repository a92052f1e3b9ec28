//! Trigger table.
//!
//! The first word of a `PRIVMSG`, lowercased, is looked up among the
//! triggers whose scope admits the place it was said in. Matching entries run
//! in table order until one reports the message handled.

mod builtin;

use slirc_client::Irc;
use slirc_proto::ChannelExt;

use crate::bot::Bot;

pub use builtin::builtin_table;

/// Where a trigger may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Channel,
    Query,
    Both,
}

impl Scope {
    pub fn admits(self, in_channel: bool) -> bool {
        match self {
            Scope::Both => true,
            Scope::Channel => in_channel,
            Scope::Query => !in_channel,
        }
    }
}

/// What `!help` shows for a trigger.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    /// Argument synopsis, may be empty.
    pub args: &'static str,
    pub description: &'static str,
}

pub type TriggerFn = fn(&Bot, &Irc, &Invocation<'_>) -> anyhow::Result<bool>;

/// One trigger table entry.
pub struct Trigger {
    /// Lowercase words that fire this entry.
    pub triggers: &'static [&'static str],
    /// Hidden from `!help` when `None`.
    pub usage: Option<Usage>,
    pub scope: Scope,
    pub handler: TriggerFn,
}

impl Trigger {
    fn matches(&self, command: &str, in_channel: bool) -> bool {
        self.scope.admits(in_channel) && self.triggers.contains(&command)
    }

    /// `!a or !b <args>`
    fn synopsis(&self) -> Option<String> {
        let usage = self.usage?;
        let mut line = self.triggers.join(" or ");
        if !usage.args.is_empty() {
            line.push(' ');
            line.push_str(usage.args);
        }
        Some(line)
    }
}

/// A `PRIVMSG` split into trigger word and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub nick: &'a str,
    pub userhost: &'a str,
    /// Channel, or our own nick for a private message.
    pub target: &'a str,
    /// First word, lowercased.
    pub command: String,
    /// Everything after the first space, if anything.
    pub args: Option<&'a str>,
}

impl<'a> Invocation<'a> {
    pub fn new(nick: &'a str, userhost: &'a str, target: &'a str, text: &'a str) -> Self {
        let (command, args) = match text.split_once(' ') {
            Some((command, args)) => (command, Some(args.trim()).filter(|a| !a.is_empty())),
            None => (text, None),
        };
        Self {
            nick,
            userhost,
            target,
            command: command.to_lowercase(),
            args,
        }
    }

    pub fn in_channel(&self) -> bool {
        self.target.is_channel_name()
    }

    /// Where replies go: the channel, or the sender of a private message.
    pub fn reply_to(&self) -> &'a str {
        if self.in_channel() {
            self.target
        } else {
            self.nick
        }
    }
}

/// Run the first matching triggers until one handles `invocation`.
pub fn dispatch(bot: &Bot, irc: &Irc, invocation: &Invocation<'_>) -> anyhow::Result<bool> {
    let in_channel = invocation.in_channel();
    for trigger in bot.triggers() {
        if trigger.matches(&invocation.command, in_channel)
            && (trigger.handler)(bot, irc, invocation)?
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `!help` listing for triggers usable in (or, from a query, anywhere
/// besides) a channel.
pub fn help_listing(table: &[Trigger], in_channel: bool) -> String {
    table
        .iter()
        .filter(|t| !in_channel || t.scope.admits(true))
        .filter_map(Trigger::synopsis)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One `synopsis: description` line per documented trigger.
pub fn help_details(table: &[Trigger]) -> Vec<String> {
    table
        .iter()
        .filter_map(|t| Some(format!("{}: {}", t.synopsis()?, t.usage?.description)))
        .collect()
}
