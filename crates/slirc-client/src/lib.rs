//! # slirc-client
//!
//! A reconnecting IRC client engine built on [`slirc_proto`].
//!
//! The engine frames and parses incoming lines, runs them through ordered
//! handler chains, answers `PING`, registers with the server, rejoins
//! channels, and reconnects with backoff when the connection drops.
//!
//! ```no_run
//! use slirc_client::{Client, Config, EventArgs};
//!
//! # async fn run() {
//! let mut config = Config::new("irc.example.org", 6667, "noiler");
//! config.identity.channels = vec!["#rust".into()];
//!
//! let client = Client::new(config);
//! let irc = client.irc();
//! irc.on("PRIVMSG", |irc, event| {
//!     if let EventArgs::Text { target, text } = &event.args {
//!         if text == "!ping" {
//!             irc.privmsg(target, "pong");
//!             return Ok(true);
//!         }
//!     }
//!     Ok(false)
//! });
//!
//! client.connect().await;
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod registry;
pub mod scheduler;
pub mod telemetry;
pub mod transport;

pub use client::{Client, ConnectionState, Irc, NICK_RECLAIM_SLOT};
pub use config::{Config, ConfigError};
pub use error::{SchedulerBusy, TransportError};
pub use event::{Event, EventArgs};
pub use registry::{FALLBACK, Handler};
pub use scheduler::{DeferredHandle, Scheduler};
