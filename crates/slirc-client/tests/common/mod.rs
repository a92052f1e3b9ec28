//! In-process fake IRC server.
//!
//! Accepts the engine's connections and lets a test read what the engine
//! sends and push server lines back.

#![allow(dead_code)]

use std::time::Duration;

use slirc_client::{Client, Config, ConnectionState, Irc};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub const STEP: Duration = Duration::from_secs(5);

/// A listening fake server.
pub struct FakeServer {
    listener: TcpListener,
    port: u16,
}

impl FakeServer {
    pub async fn bind() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();
        Ok(Self { listener, port })
    }

    /// Engine config pointing at this server, reconnecting immediately and
    /// without the nick reclaim timer.
    pub fn config(&self, nick: &str) -> Config {
        let mut config = Config::new("127.0.0.1", self.port, nick);
        config.timeouts.connect_secs = 5;
        config.reconnect.initial_delay_secs = 0;
        config.reconnect.max_delay_secs = 0;
        config.limits.nick_reclaim_secs = 0;
        config
    }

    /// Wait for the engine to connect.
    pub async fn accept(&self) -> anyhow::Result<Peer> {
        let (stream, _) = timeout(STEP, self.listener.accept()).await??;
        let (read_half, writer) = stream.into_split();
        Ok(Peer {
            reader: BufReader::new(read_half),
            writer,
        })
    }

    /// Whether the engine opens a new connection within `wait`.
    pub async fn connects_within(&self, wait: Duration) -> bool {
        timeout(wait, self.listener.accept()).await.is_ok()
    }
}

/// The server side of one engine connection.
pub struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    /// Send a raw line, adding CRLF if missing.
    pub async fn send_raw(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the engine, without its line ending.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(STEP, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("engine closed the connection");
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Read lines until `predicate` matches one, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Read the `NICK`/`USER` pair and welcome the engine as `nick`.
    pub async fn register(&mut self, nick: &str) -> anyhow::Result<Vec<String>> {
        let lines = self.recv_until(|line| line.starts_with("USER ")).await?;
        self.send_raw(&format!(":irc.test 001 {nick} :Welcome to the test network"))
            .await?;
        Ok(lines)
    }

    /// Abort the connection with an RST instead of a FIN.
    pub fn reset(self) -> anyhow::Result<()> {
        let stream = self.reader.into_inner().reunite(self.writer)?;
        #[allow(deprecated)]
        stream.set_linger(Some(Duration::ZERO))?;
        drop(stream);
        Ok(())
    }

    /// Whether the engine closed its end within [`STEP`].
    pub async fn closed(&mut self) -> bool {
        let mut line = String::new();
        loop {
            line.clear();
            match timeout(STEP, self.reader.read_line(&mut line)).await {
                Ok(Ok(0)) | Ok(Err(_)) => return true,
                Ok(Ok(_)) => continue,
                Err(_) => return false,
            }
        }
    }
}

/// Start the engine on its own task.
pub fn start(client: Client) -> (Irc, JoinHandle<()>) {
    let irc = client.irc();
    (irc, tokio::spawn(client.connect()))
}

pub async fn wait_for(irc: &Irc, state: ConnectionState) -> anyhow::Result<()> {
    timeout(STEP, irc.wait_for_state(state)).await?;
    Ok(())
}

/// Stop the engine and wait for its task.
pub async fn stop(irc: &Irc, task: JoinHandle<()>) -> anyhow::Result<()> {
    irc.end();
    timeout(STEP, task).await??;
    Ok(())
}
