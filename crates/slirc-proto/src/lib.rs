//! # slirc-proto
//!
//! Sans-IO building blocks for classic IRC clients: line framing, message
//! parsing and serialisation, prefix splitting, mode decoding, and numeric
//! reply names.
//!
//! ## Quick Start
//!
//! ### Framing and parsing
//!
//! ```rust
//! use slirc_proto::{LineFramer, Message};
//!
//! let mut framer = LineFramer::new();
//! assert!(framer.feed(b":irc.example.org PI").is_empty());
//!
//! for line in framer.feed(b"NG :abc123\r\n") {
//!     let msg = Message::parse(&line.unwrap()).unwrap();
//!     assert_eq!(msg.command, "PING");
//!     assert_eq!(msg.args, vec!["abc123"]);
//! }
//! ```
//!
//! ### Building messages
//!
//! ```rust
//! use slirc_proto::Message;
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! assert_eq!(privmsg.to_string(), "PRIVMSG #rust :Hello, world!");
//! ```
//!
//! ### Decoding modes
//!
//! ```rust
//! use slirc_proto::{ModeChange, ModeSpec, Sign};
//!
//! let changes = ModeSpec::default().parse(&["+o-v", "alice", "bob"]).unwrap();
//! assert_eq!(changes[0], ModeChange::with_param(Sign::Add, 'o', "alice"));
//! assert_eq!(changes[1], ModeChange::with_param(Sign::Remove, 'v', "bob"));
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod casemap;
pub mod chan;
pub mod error;
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;

pub use self::casemap::{irc_eq, irc_lower_char, irc_to_lower};
pub use self::chan::ChannelExt;
pub use self::error::{MessageParseError, ModeParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::line::{sanitize, LineFramer, DEFAULT_MAX_LINE_LEN};
pub use self::message::Message;
pub use self::mode::{parse_modes, ModeChange, ModeSpec, Sign};
pub use self::prefix::{split_prefix, Prefix};
pub use self::response::{command_key, Response};
