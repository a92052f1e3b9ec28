//! Callback registry and dispatch.
//!
//! Two tiers: an exact-match table keyed by command, and one fallback list
//! registered under [`FALLBACK`]. Each tier keeps insertion order, which is
//! dispatch order.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use slirc_proto::{Message, MessageParseError, command_key};
use tracing::{error, trace, warn};

use crate::client::Irc;
use crate::event::Event;
use crate::telemetry::spans;

/// Registry key for fallback handlers.
pub const FALLBACK: &str = "*";

/// A message handler.
///
/// Return `Ok(true)` to mark the message handled and stop the chain. An
/// `Err` (or a panic) is logged and counts as not handled. Handlers run on
/// the receive task: anything slow belongs in [`Irc::spawn`].
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool>;
}

impl<F> Handler for F
where
    F: Fn(&Irc, &Event<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
{
    fn handle(&self, irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
        self(irc, event)
    }
}

/// Ordered handler chains.
#[derive(Default)]
pub struct Registry {
    exact: HashMap<String, Vec<Arc<dyn Handler>>>,
    fallback: Vec<Arc<dyn Handler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the chain for `key`.
    ///
    /// Keys are case-insensitive, and numeric names such as `RPL_WELCOME`
    /// are stored under their code. [`FALLBACK`] appends to the fallback
    /// list.
    pub fn register(&mut self, key: &str, handler: Arc<dyn Handler>) {
        if key == FALLBACK {
            self.fallback.push(handler);
        } else {
            self.exact.entry(command_key(key)).or_default().push(handler);
        }
    }

    /// Snapshot of the chain a pass would run, in order.
    pub fn chain(&self, command: &str, fallback: bool) -> Vec<Arc<dyn Handler>> {
        if fallback {
            self.fallback.clone()
        } else {
            self.exact.get(command).cloned().unwrap_or_default()
        }
    }

    pub fn has_fallback(&self) -> bool {
        !self.fallback.is_empty()
    }

    /// Number of handlers registered under `key`.
    pub fn count(&self, key: &str) -> usize {
        if key == FALLBACK {
            self.fallback.len()
        } else {
            self.exact.get(&command_key(key)).map_or(0, Vec::len)
        }
    }
}

/// Run one dispatch pass for `msg`.
///
/// The chain is snapshotted first so handlers may register more handlers.
/// Returns whether some handler claimed the message; a `MODE` line whose
/// mode string does not decode is an error.
pub(crate) fn dispatch(irc: &Irc, msg: &Message, fallback: bool) -> Result<bool, MessageParseError> {
    let chain = irc.registry().read().chain(&msg.command, fallback);
    if chain.is_empty() {
        return Ok(false);
    }

    let modes = irc.mode_spec();
    let event = Event::new(msg, fallback, &modes)?;

    let span = spans::dispatch(&msg.command, fallback);
    let _enter = span.enter();

    for (index, handler) in chain.iter().enumerate() {
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(irc, &event))) {
            Ok(Ok(true)) => {
                trace!(handler = index, "handled");
                return Ok(true);
            }
            Ok(Ok(false)) => {}
            Ok(Err(e)) => {
                warn!(handler = index, error = %format!("{e:#}"), "Handler failed");
            }
            Err(payload) => {
                error!(handler = index, panic = %panic_message(payload.as_ref()), "Handler panicked");
            }
        }
    }

    Ok(false)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Client, Config};
    use std::sync::Mutex;

    fn noop() -> Arc<dyn Handler> {
        Arc::new(|_: &Irc, _: &Event<'_>| -> anyhow::Result<bool> { Ok(false) })
    }

    #[test]
    fn test_keys_are_normalised() {
        let mut registry = Registry::new();
        registry.register("privmsg", noop());
        registry.register("RPL_WELCOME", noop());
        registry.register("001", noop());
        registry.register(FALLBACK, noop());

        assert_eq!(registry.count("PRIVMSG"), 1);
        assert_eq!(registry.count("001"), 2);
        assert_eq!(registry.count("rpl_welcome"), 2);
        assert_eq!(registry.count(FALLBACK), 1);
        assert!(registry.has_fallback());
        assert_eq!(registry.chain("001", false).len(), 2);
        assert_eq!(registry.chain("001", true).len(), 1);
        assert!(registry.chain("NOTICE", false).is_empty());
    }

    fn message(line: &str) -> Message {
        Message::parse(line).unwrap()
    }

    fn irc() -> Irc {
        Client::new(Config::new("localhost", 6667, "noiler")).irc()
    }

    #[test]
    fn test_chain_stops_at_first_true() {
        let irc = irc();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for (name, result) in [("first", false), ("second", true), ("third", true)] {
            let calls = Arc::clone(&calls);
            irc.on("PRIVMSG", move |_, _| {
                calls.lock().unwrap().push(name);
                Ok(result)
            });
        }

        let handled = dispatch(&irc, &message(":a!b@c PRIVMSG #x :hi"), false).unwrap();
        assert!(handled);
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_error_and_panic_count_as_unhandled() {
        let irc = irc();
        let reached = Arc::new(Mutex::new(false));

        irc.on("NOTICE", |_, _| Err(anyhow::anyhow!("boom")));
        irc.on("NOTICE", |_, _| panic!("handler bug"));
        let flag = Arc::clone(&reached);
        irc.on("NOTICE", move |_, _| {
            *flag.lock().unwrap() = true;
            Ok(false)
        });

        let handled = dispatch(&irc, &message(":a!b@c NOTICE #x :hi"), false).unwrap();
        assert!(!handled);
        assert!(*reached.lock().unwrap());
    }

    #[test]
    fn test_fallback_pass_sees_raw_shape() {
        let irc = irc();
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        irc.on(FALLBACK, move |_, event| {
            *slot.lock().unwrap() = Some(event.command().to_string());
            Ok(true)
        });

        let msg = message(":irc.example.org 372 noiler :- motd");
        assert!(!dispatch(&irc, &msg, false).unwrap());
        assert!(dispatch(&irc, &msg, true).unwrap());
        assert_eq!(seen.lock().unwrap().as_deref(), Some("372"));
    }

    #[test]
    fn test_bad_mode_is_an_error() {
        let irc = irc();
        irc.on("MODE", |_, _| Ok(true));
        assert!(dispatch(&irc, &message(":op!o@h MODE #x +b"), false).is_err());
    }

    #[test]
    fn test_bad_mode_without_handlers_is_ignored() {
        let irc = irc();
        assert!(!dispatch(&irc, &message(":op!o@h MODE #x +b"), false).unwrap());
    }

    #[test]
    fn test_handler_may_register_during_dispatch() {
        let irc = irc();
        irc.on("JOIN", |irc, _| {
            irc.on("JOIN", |_, _| Ok(true));
            Ok(false)
        });

        let msg = message(":a!b@c JOIN #x");
        assert!(!dispatch(&irc, &msg, false).unwrap());
        assert!(dispatch(&irc, &msg, false).unwrap());
    }
}
