//! IRC numeric reply codes a client commonly sees.
//!
//! Numerics travel on the wire as three digit command tokens. This module
//! names them so handlers can be registered as `RPL_WELCOME` instead of
//! `001`.
//!
//! # Reference
//! - RFC 2812 Section 5: Replies
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;

macro_rules! responses {
    ($( $(#[$doc:meta])* $name:ident = $code:literal ),* $(,)?) => {
        /// IRC server numeric reply.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $( $(#[$doc])* $name = $code, )*
        }

        impl Response {
            /// Look up a reply by numeric code.
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $( $code => Some(Response::$name), )*
                    _ => None,
                }
            }

            /// Look up a reply by symbolic name (`RPL_WELCOME`).
            pub fn from_name(name: &str) -> Option<Response> {
                match name {
                    $( stringify!($name) => Some(Response::$name), )*
                    _ => None,
                }
            }

            /// Symbolic name of the reply.
            pub fn name(&self) -> &'static str {
                match self {
                    $( Response::$name => stringify!($name), )*
                }
            }
        }
    };
}

responses! {
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info
    RPL_MYINFO = 4,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    /// 251 - Users on the network
    RPL_LUSERCLIENT = 251,
    /// 252 - Operators online
    RPL_LUSEROP = 252,
    /// 253 - Unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Channels formed
    RPL_LUSERCHANNELS = 254,
    /// 255 - Local clients and servers
    RPL_LUSERME = 255,
    /// 265 - Local user count
    RPL_LOCALUSERS = 265,
    /// 266 - Global user count
    RPL_GLOBALUSERS = 266,
    /// 301 - Target is away
    RPL_AWAY = 301,
    /// 311 - WHOIS user
    RPL_WHOISUSER = 311,
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318,
    /// 324 - Channel modes
    RPL_CHANNELMODEIS = 324,
    /// 329 - Channel creation time
    RPL_CREATIONTIME = 329,
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Topic setter and time
    RPL_TOPICWHOTIME = 333,
    /// 341 - Invite sent
    RPL_INVITING = 341,
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES
    RPL_ENDOFNAMES = 366,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - Start of MOTD
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 405 - Too many channels
    ERR_TOOMANYCHANNELS = 405,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - MOTD file missing
    ERR_NOMOTD = 422,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEUSNICKNAME = 432,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 436 - Nickname collision
    ERR_NICKCOLLISION = 436,
    /// 437 - Nick/channel temporarily unavailable
    ERR_UNAVAILRESOURCE = 437,
    /// 442 - Not on channel
    ERR_NOTONCHANNEL = 442,
    /// 451 - Not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered
    ERR_ALREADYREGISTRED = 462,
    /// 464 - Password incorrect
    ERR_PASSWDMISMATCH = 464,
    /// 465 - Banned from server
    ERR_YOUREBANNEDCREEP = 465,
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471,
    /// 473 - Invite only channel
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475,
    /// 477 - Channel requires registration
    ERR_NEEDREGGEDNICK = 477,
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482,
}

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The three digit wire token (`"001"`).
    pub fn command(&self) -> String {
        format!("{:03}", self.code())
    }

    /// Look up a reply from a wire command token.
    pub fn from_command(command: &str) -> Option<Response> {
        if command.len() != 3 || !command.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        command.parse().ok().and_then(Response::from_code)
    }

    /// Check if this is an error reply (4xx, 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Normalise a command name for table lookups.
///
/// Uppercases it and turns symbolic numeric names into their wire token,
/// so `"rpl_welcome"`, `"RPL_WELCOME"` and `"001"` all map to `"001"`.
pub fn command_key(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match Response::from_name(&upper) {
        Some(response) => response.command(),
        None => upper,
    }
}
