//! IRC message prefix decomposition.
//!
//! A prefix identifies the origin of a message: either a user
//! (`nick!user@host`) or a server name. Splitting happens once on `!`;
//! without one the whole token is the name and the user-host part is empty.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;

/// Split a raw prefix into `(nick, userhost)`.
///
/// ```
/// use slirc_proto::split_prefix;
///
/// assert_eq!(split_prefix("nick!user@host"), ("nick", "user@host"));
/// assert_eq!(split_prefix("server.example.org"), ("server.example.org", ""));
/// ```
pub fn split_prefix(prefix: &str) -> (&str, &str) {
    prefix.split_once('!').unwrap_or((prefix, ""))
}

/// Owned, decomposed prefix.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// Nickname, or the server name when `userhost` is empty.
    pub nick: String,
    /// `user@host`, empty for server prefixes.
    pub userhost: String,
}

impl Prefix {
    /// Decompose a raw prefix string.
    pub fn parse(s: &str) -> Self {
        let (nick, userhost) = split_prefix(s);
        Self {
            nick: nick.to_owned(),
            userhost: userhost.to_owned(),
        }
    }

    /// Whether the prefix denotes a server rather than a user.
    pub fn is_server(&self) -> bool {
        self.userhost.is_empty()
    }

    /// Username (ident) part, if present.
    pub fn user(&self) -> Option<&str> {
        self.userhost
            .split_once('@')
            .map(|(user, _)| user)
            .filter(|u| !u.is_empty())
    }

    /// Hostname part, if present.
    pub fn host(&self) -> Option<&str> {
        self.userhost
            .split_once('@')
            .map(|(_, host)| host)
            .filter(|h| !h.is_empty())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.userhost.is_empty() {
            f.write_str(&self.nick)
        } else {
            write!(f, "{}!{}", self.nick, self.userhost)
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_user_prefix() {
        assert_eq!(split_prefix("nick!user@host"), ("nick", "user@host"));
    }

    #[test]
    fn test_split_server_prefix() {
        assert_eq!(
            split_prefix("server.example.org"),
            ("server.example.org", "")
        );
    }

    #[test]
    fn test_split_only_once() {
        assert_eq!(split_prefix("a!b!c@d"), ("a", "b!c@d"));
    }

    #[test]
    fn test_parts() {
        let p = Prefix::parse("dan!~dan@host.example.org");
        assert!(!p.is_server());
        assert_eq!(p.user(), Some("~dan"));
        assert_eq!(p.host(), Some("host.example.org"));
        assert_eq!(p.to_string(), "dan!~dan@host.example.org");
    }

    #[test]
    fn test_server_parts() {
        let p = Prefix::from("irc.example.org");
        assert!(p.is_server());
        assert_eq!(p.user(), None);
        assert_eq!(p.host(), None);
        assert_eq!(p.to_string(), "irc.example.org");
    }
}
