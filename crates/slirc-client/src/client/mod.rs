//! Connection lifecycle and the handle handed to handlers.
//!
//! [`Client`] owns the receive loop. [`Irc`] is the cheap, cloneable handle
//! through which handlers, deferred actions and background tasks send lines,
//! register more handlers and control the lifecycle. Every outbound line goes
//! through one queue drained by the receive loop, so lines from different
//! tasks never interleave on the socket.

mod internal;
mod session;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use slirc_proto::{Message, MessageParseError, ModeSpec};
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, warn};

use crate::config::Config;
use crate::error::SchedulerBusy;
use crate::event::Event;
use crate::registry::{self, Handler, Registry};
use crate::scheduler::{DeferredHandle, Scheduler};

pub use internal::NICK_RECLAIM_SLOT;

/// Where the connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Built, `connect` not called yet.
    Disconnected,
    /// Opening the socket (and TLS).
    Connecting,
    /// `NICK`/`USER` sent, waiting for the welcome reply.
    Registering,
    /// Welcomed; channels joined.
    Joined,
    /// Lost the connection, waiting out the backoff.
    Reconnecting,
    /// `end()` was observed. Terminal.
    Ended,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Registering => "registering",
            Self::Joined => "joined",
            Self::Reconnecting => "reconnecting",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}

struct Inner {
    config: Config,
    nick: RwLock<String>,
    registry: RwLock<Registry>,
    mode_spec: RwLock<ModeSpec>,
    scheduler: Scheduler,
    outbound: mpsc::UnboundedSender<String>,
    state: watch::Sender<ConnectionState>,
    ended: AtomicBool,
    reconnect_requested: AtomicBool,
    /// Interrupts the receive loop (or the backoff wait) after `end()` or
    /// `reconnect()`.
    wake: Notify,
}

/// Handle to a client connection.
#[derive(Clone)]
pub struct Irc {
    inner: Arc<Inner>,
}

impl Irc {
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The nick the server currently knows us by.
    pub fn current_nick(&self) -> String {
        self.inner.nick.read().clone()
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    /// Wait until the connection reaches `target`.
    pub async fn wait_for_state(&self, target: ConnectionState) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|state| *state == target).await;
    }

    pub fn is_ended(&self) -> bool {
        self.inner.ended.load(Ordering::SeqCst)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    // === Handlers ===

    /// Register a handler for a command, numeric name, or [`FALLBACK`].
    ///
    /// [`FALLBACK`]: crate::FALLBACK
    pub fn on<F>(&self, key: &str, handler: F)
    where
        F: Fn(&Irc, &Event<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.on_handler(key, Arc::new(handler));
    }

    pub fn on_handler(&self, key: &str, handler: Arc<dyn Handler>) {
        self.inner.registry.write().register(key, handler);
    }

    /// Run a single dispatch pass for `msg`.
    pub fn dispatch(&self, msg: &Message, fallback: bool) -> Result<bool, MessageParseError> {
        registry::dispatch(self, msg, fallback)
    }

    /// Run the exact pass, then the fallback pass if nothing claimed `msg`
    /// and a fallback handler exists.
    pub fn dispatch_all(&self, msg: &Message) -> Result<bool, MessageParseError> {
        if self.dispatch(msg, false)? {
            return Ok(true);
        }
        if !self.inner.registry.read().has_fallback() {
            return Ok(false);
        }
        self.dispatch(msg, true)
    }

    pub(crate) fn registry(&self) -> &RwLock<Registry> {
        &self.inner.registry
    }

    /// Mode parameter rules as last advertised by the server.
    pub fn mode_spec(&self) -> ModeSpec {
        self.inner.mode_spec.read().clone()
    }

    // === Sending ===

    /// Queue one raw line. Anything after an embedded CR or LF is dropped.
    pub fn sendline(&self, line: impl Into<String>) {
        if self.inner.outbound.send(line.into()).is_err() {
            warn!("Outbound queue closed, line dropped");
        }
    }

    /// Queue the tokens joined with single spaces.
    pub fn send<I, S>(&self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let line = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.sendline(line);
    }

    pub fn send_message(&self, msg: &Message) {
        self.sendline(msg.to_string());
    }

    pub fn privmsg(&self, target: &str, text: &str) {
        self.send_message(&Message::privmsg(target, text));
    }

    pub fn notice(&self, target: &str, text: &str) {
        self.send_message(&Message::notice(target, text));
    }

    pub fn join(&self, channel: &str, key: Option<&str>) {
        self.send_message(&Message::join(channel, key));
    }

    pub fn part(&self, channel: &str) {
        self.send_message(&Message::part(channel));
    }

    /// Ask the server for a new nick. The current nick changes once the
    /// server confirms.
    pub fn nick(&self, nick: &str) {
        self.send_message(&Message::new("NICK", [nick]));
    }

    /// Queue `QUIT` and end the connection once it has been written.
    pub fn quit(&self, reason: Option<&str>) {
        self.send_message(&Message::quit(reason));
        self.end();
    }

    // === Lifecycle ===

    /// Stop the client. Queued lines are flushed and the socket is closed;
    /// no reconnect follows.
    pub fn end(&self) {
        if !self.inner.ended.swap(true, Ordering::SeqCst) {
            info!("End requested");
        }
        self.inner.wake.notify_one();
    }

    /// Drop the current connection and connect again with the same identity.
    pub fn reconnect(&self) {
        self.inner.reconnect_requested.store(true, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }

    // === Deferred actions and offloading ===

    /// Run `action` after `delay` unless `slot` already holds a pending
    /// action.
    pub fn schedule_deferred<F>(
        &self,
        slot: &str,
        delay: Duration,
        action: F,
    ) -> Result<DeferredHandle, SchedulerBusy>
    where
        F: FnOnce(&Irc) + Send + 'static,
    {
        let irc = self.clone();
        self.inner
            .scheduler
            .schedule(slot, delay, move || action(&irc))
    }

    pub fn cancel_deferred(&self, handle: &DeferredHandle) -> bool {
        self.inner.scheduler.cancel(handle)
    }

    /// Run slow work off the receive task. An error is logged.
    pub fn spawn<F, Fut>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce(Irc) -> Fut,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let fut = task(self.clone());
        tokio::spawn(
            async move {
                if let Err(e) = fut.await {
                    warn!(error = %format!("{e:#}"), "Background task failed");
                }
            }
            .in_current_span(),
        )
    }

    /// Like [`spawn`](Self::spawn), for blocking closures.
    pub fn spawn_blocking<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce(Irc) -> anyhow::Result<()> + Send + 'static,
    {
        let irc = self.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || {
            let _enter = span.enter();
            if let Err(e) = task(irc) {
                warn!(error = %format!("{e:#}"), "Blocking task failed");
            }
        })
    }

    // === Engine internals ===

    fn set_state(&self, state: ConnectionState) {
        let previous = self.inner.state.send_replace(state);
        if previous != state {
            debug!(from = %previous, to = %state, "State changed");
        }
    }

    fn set_nick(&self, nick: &str) {
        *self.inner.nick.write() = nick.to_string();
    }

    fn take_reconnect_request(&self) -> bool {
        self.inner.reconnect_requested.swap(false, Ordering::SeqCst)
    }

    /// Forget what the last connection learned.
    fn reset_session(&self) {
        self.inner.reconnect_requested.store(false, Ordering::SeqCst);
        self.set_nick(&self.inner.config.identity.nick);
        *self.inner.mode_spec.write() = ModeSpec::default();
        self.inner.scheduler.cancel_slot(NICK_RECLAIM_SLOT);
    }
}

impl fmt::Debug for Irc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Irc")
            .field("nick", &self.current_nick())
            .field("state", &self.state())
            .finish()
    }
}

/// An IRC connection that reconnects until ended.
pub struct Client {
    irc: Irc,
    outbound: mpsc::UnboundedReceiver<String>,
}

impl Client {
    /// Build a client. Nothing touches the network until
    /// [`connect`](Self::connect).
    pub fn new(config: Config) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        let irc = Irc {
            inner: Arc::new(Inner {
                nick: RwLock::new(config.identity.nick.clone()),
                config,
                registry: RwLock::new(Registry::new()),
                mode_spec: RwLock::new(ModeSpec::default()),
                scheduler: Scheduler::new(),
                outbound: tx,
                state,
                ended: AtomicBool::new(false),
                reconnect_requested: AtomicBool::new(false),
                wake: Notify::new(),
            }),
        };
        internal::register(&irc);

        Self { irc, outbound: rx }
    }

    /// A handle for registering handlers and sending.
    pub fn irc(&self) -> Irc {
        self.irc.clone()
    }

    /// Connect and keep the connection up until [`Irc::end`] is called.
    ///
    /// Transport failures are logged and followed by a reconnect after the
    /// configured backoff; they never end this future.
    pub async fn connect(mut self) {
        let irc = self.irc.clone();
        let (host, port) = (irc.config().server.host.clone(), irc.config().server.port);
        let mut backoff = session::Backoff::new(&irc.config().reconnect);
        let mut attempt = 0u64;

        while !irc.is_ended() {
            attempt += 1;
            let span = crate::telemetry::spans::session(&host, port, attempt);

            let outcome = self.session().instrument(span.clone()).await;
            let welcomed = irc.state() == ConnectionState::Joined;

            let delay = span.in_scope(|| {
                match outcome {
                    Ok(session::SessionEnd::Ended) => return None,
                    Ok(session::SessionEnd::Reconnect) => info!("Reconnect requested"),
                    Err(e) => warn!(error = %e, code = e.error_code(), "Connection lost"),
                }
                if irc.is_ended() {
                    return None;
                }

                if welcomed {
                    backoff.reset();
                }
                let delay = backoff.next_delay();
                irc.set_state(ConnectionState::Reconnecting);
                info!(delay_secs = delay.as_secs(), "Reconnecting");
                Some(delay)
            });
            let Some(delay) = delay else {
                break;
            };

            // Only end() cuts the wait short; a wakeup left by reconnect()
            // is swallowed here.
            let sleep = tokio::time::sleep(delay);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    _ = irc.inner.wake.notified() => {
                        if irc.is_ended() {
                            break;
                        }
                    }
                }
            }
        }

        irc.inner.scheduler.cancel_all();
        irc.set_state(ConnectionState::Ended);
        info!("Client ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(client: &mut Client) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = client.outbound.try_recv() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_send_helpers_queue_in_order() {
        let mut client = Client::new(Config::new("localhost", 6667, "noiler"));
        let irc = client.irc();

        irc.send(["MODE", "#a", "+o", "dan"]);
        irc.privmsg("#a", "hello there");
        irc.notice("dan", "hi");
        irc.join("#b", Some("key"));
        irc.part("#b");
        irc.nick("noiler2");

        assert_eq!(
            drain(&mut client),
            vec![
                "MODE #a +o dan",
                "PRIVMSG #a :hello there",
                "NOTICE dan :hi",
                "JOIN #b key",
                "PART #b",
                "NICK noiler2",
            ]
        );
        // NICK is only a request
        assert_eq!(irc.current_nick(), "noiler");
    }

    #[test]
    fn test_quit_queues_and_ends() {
        let mut client = Client::new(Config::new("localhost", 6667, "noiler"));
        let irc = client.irc();
        assert!(!irc.is_ended());

        irc.quit(None);
        assert!(irc.is_ended());
        assert_eq!(drain(&mut client), vec!["QUIT"]);
    }

    #[test]
    fn test_initial_state() {
        let client = Client::new(Config::new("localhost", 6667, "noiler"));
        let irc = client.irc();
        assert_eq!(irc.state(), ConnectionState::Disconnected);
        assert_eq!(irc.state().to_string(), "disconnected");
        assert_eq!(irc.current_nick(), "noiler");
    }

    #[tokio::test]
    async fn test_end_before_connect_returns() {
        let client = Client::new(Config::new("localhost", 6667, "noiler"));
        let irc = client.irc();
        irc.end();
        client.connect().await;
        assert_eq!(irc.state(), ConnectionState::Ended);
    }
}
