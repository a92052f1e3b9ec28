//! One connection attempt: connect, register, then pump lines until the
//! socket fails, a reconnect is requested, or the client ends.

use std::time::Duration;

use futures_util::SinkExt;
use slirc_proto::{LineCodec, LineFramer, Message, MessageParseError, ProtocolError};
use tokio::io::{AsyncReadExt, AsyncWrite, WriteHalf};
use tokio::time::Instant;
use tokio_util::codec::FramedWrite;
use tracing::{debug, info, warn};

use super::{Client, ConnectionState, Irc};
use crate::config::ReconnectConfig;
use crate::error::TransportError;
use crate::telemetry;
use crate::transport::{self, IrcStream};

const READ_BUF_SIZE: usize = 4096;

type LineWriter = FramedWrite<WriteHalf<IrcStream>, LineCodec>;

/// How a session ended without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SessionEnd {
    Ended,
    Reconnect,
}

/// Exponential reconnect delay.
#[derive(Debug)]
pub(super) struct Backoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl Backoff {
    pub(super) fn new(config: &ReconnectConfig) -> Self {
        let initial = Duration::from_secs(config.initial_delay_secs);
        Self {
            initial,
            max: Duration::from_secs(config.max_delay_secs),
            next: initial,
        }
    }

    pub(super) fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        delay
    }

    pub(super) fn reset(&mut self) {
        self.next = self.initial;
    }
}

impl Client {
    pub(super) async fn session(&mut self) -> Result<SessionEnd, TransportError> {
        let irc = self.irc.clone();
        let config = irc.config();

        irc.reset_session();
        irc.set_state(ConnectionState::Connecting);

        let stream = transport::connect(&config.server, config.timeouts.connect()).await?;
        let (mut reader, writer) = tokio::io::split(stream);
        let mut writer: LineWriter =
            FramedWrite::new(writer, LineCodec::with_max_len(config.limits.max_line_len));

        let mut stale = 0usize;
        while self.outbound.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(count = stale, "Dropped lines queued while disconnected");
        }

        irc.set_state(ConnectionState::Registering);
        let identity = &config.identity;
        if let Some(ref password) = config.server.password {
            write_line(&mut writer, format!("PASS {password}")).await?;
        }
        write_line(&mut writer, format!("NICK {}", identity.nick)).await?;
        write_line(
            &mut writer,
            format!(
                "USER {} {} * :{}",
                identity.username(),
                identity.mode_bits,
                identity.realname()
            ),
        )
        .await?;
        info!(nick = %identity.nick, "Registering");

        let mut framer = LineFramer::with_max_len(config.limits.max_line_len);
        let mut buf = vec![0u8; READ_BUF_SIZE];
        let read_timeout = config.timeouts.read();
        let mut deadline = Instant::now() + read_timeout;

        loop {
            if irc.is_ended() {
                while let Ok(line) = self.outbound.try_recv() {
                    write_line(&mut writer, line).await?;
                }
                writer.close().await?;
                return Ok(SessionEnd::Ended);
            }
            if irc.take_reconnect_request() {
                return Ok(SessionEnd::Reconnect);
            }

            tokio::select! {
                biased;

                _ = irc.inner.wake.notified() => {}
                Some(line) = self.outbound.recv() => {
                    write_line(&mut writer, line).await?;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(TransportError::ReadTimeout(read_timeout));
                }
                read = reader.read(&mut buf) => {
                    let n = read?;
                    if n == 0 {
                        return Err(TransportError::Closed);
                    }
                    deadline = Instant::now() + read_timeout;
                    for line in framer.feed(&buf[..n]) {
                        handle_line(&irc, line);
                    }
                }
            }
        }
    }
}

async fn write_line<W>(
    writer: &mut FramedWrite<W, LineCodec>,
    line: String,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    telemetry::wire("send", slirc_proto::sanitize(&line));
    writer.send(line).await?;
    Ok(())
}

/// Parse and dispatch one framed line. Nothing here can end the session.
fn handle_line(irc: &Irc, line: Result<String, ProtocolError>) {
    let line = match line {
        Ok(line) => line,
        Err(e) => {
            warn!(error = %e, "Dropping inbound line");
            return;
        }
    };
    if line.trim().is_empty() {
        return;
    }
    telemetry::wire("recv", &line);

    let msg = match Message::parse(&line) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, line = %line, "Malformed line");
            return;
        }
    };

    match irc.dispatch_all(&msg) {
        Ok(true) => {}
        Ok(false) if msg.command == "PING" => {
            irc.send_message(&Message::new("PONG", msg.args.first().cloned()));
        }
        Ok(false) => {}
        Err(e @ MessageParseError::InvalidModeString { .. }) => {
            warn!(error = %e, line = %line, "Malformed mode string");
        }
        Err(e) => warn!(error = %e, line = %line, "Dispatch failed"),
    }
}
