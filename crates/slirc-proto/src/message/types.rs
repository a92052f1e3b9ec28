use crate::prefix::Prefix;
use crate::response::Response;

/// An owned IRC message.
///
/// `[:prefix ]command[ param]*[ :trailing]`, with the trailing parameter
/// (if any) stored as the last element of `args` without its colon.
///
/// # Example
///
/// ```
/// use slirc_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #chan :hello there".parse().unwrap();
/// assert_eq!(msg.prefix.as_deref(), Some("nick!user@host"));
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.args, vec!["#chan", "hello there"]);
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Raw prefix/source (e.g., `nick!user@host` or `irc.example.org`).
    pub prefix: Option<String>,
    /// Command token, uppercased. Never empty.
    pub command: String,
    /// Parameters in order; the last one may contain spaces.
    pub args: Vec<String>,
}

impl Message {
    /// Build an outgoing message without a prefix.
    pub fn new<C, I, S>(command: C, args: I) -> Self
    where
        C: AsRef<str>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: None,
            command: command.as_ref().to_ascii_uppercase(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", [target, text])
    }

    /// `NOTICE <target> :<text>`
    pub fn notice(target: &str, text: &str) -> Self {
        Self::new("NOTICE", [target, text])
    }

    /// `JOIN <channel>[ <key>]`
    pub fn join(channel: &str, key: Option<&str>) -> Self {
        let mut args = vec![channel.to_string()];
        args.extend(key.map(str::to_string));
        Self::new("JOIN", args)
    }

    /// `PART <channel>`
    pub fn part(channel: &str) -> Self {
        Self::new("PART", [channel])
    }

    /// `PONG :<token>`
    pub fn pong(token: &str) -> Self {
        Self::new("PONG", [token])
    }

    /// `QUIT[ :<reason>]`
    pub fn quit(reason: Option<&str>) -> Self {
        Self::new("QUIT", reason)
    }

    /// Decompose the prefix, if any.
    pub fn source(&self) -> Option<Prefix> {
        self.prefix.as_deref().map(Prefix::parse)
    }

    /// Nickname of the sender, if the prefix names a user.
    pub fn source_nickname(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        prefix.split_once('!').map(|(nick, _)| nick)
    }

    /// Argument `n`, if present.
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.args.get(n).map(String::as_str)
    }

    /// The known numeric reply this message carries, if any.
    pub fn response(&self) -> Option<Response> {
        Response::from_command(&self.command)
    }

    /// Whether the command is a three digit numeric.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }
}
