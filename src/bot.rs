//! Bot behaviour on top of the client engine.

use std::sync::Arc;

use slirc_client::{Event, EventArgs, Irc};
use slirc_proto::{ChannelExt, irc_eq};
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::triggers::{self, Invocation, Trigger, builtin_table};
use crate::urls::TitleFetcher;

pub struct Bot {
    config: BotConfig,
    triggers: Vec<Trigger>,
    titles: Option<TitleFetcher>,
}

impl Bot {
    pub fn new(config: BotConfig) -> anyhow::Result<Self> {
        let titles = if config.url_titles {
            Some(TitleFetcher::new()?)
        } else {
            None
        };
        Ok(Self {
            config,
            triggers: builtin_table(),
            titles,
        })
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Register the bot's handlers on `irc`.
    pub fn install(self: Arc<Self>, irc: &Irc) {
        irc.on("PRIVMSG", move |irc, event| self.on_privmsg(irc, event));
        irc.on("KICK", on_kick);
    }

    fn on_privmsg(&self, irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
        let EventArgs::Text { target, text } = &event.args else {
            return Ok(false);
        };
        let (Some(nick), Some(userhost)) = (event.nick, event.userhost) else {
            return Ok(false);
        };

        if target.is_channel_name()
            && let Some(titles) = &self.titles
            && let Some(url) = titles.find_url(text)
        {
            debug!(url, "Looking up link title");
            titles.spawn_lookup(irc, target, url);
        }

        let invocation = Invocation::new(nick, userhost, target, text);
        triggers::dispatch(self, irc, &invocation)
    }
}

/// Rejoin a channel we were kicked from.
fn on_kick(irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
    let EventArgs::Text { target, text } = &event.args else {
        return Ok(false);
    };
    let victim = text.split(' ').next().unwrap_or_default();
    if !irc_eq(victim, &irc.current_nick()) {
        return Ok(false);
    }

    let key = irc
        .config()
        .identity
        .channels
        .iter()
        .find(|c| irc_eq(c.name(), target))
        .and_then(|c| c.key());
    info!(channel = %target, by = ?event.nick, "Kicked, rejoining");
    irc.join(target, key);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slirc_client::config::ChannelConfig;
    use slirc_client::{Client, Config, ConnectionState};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    const STEP: Duration = Duration::from_secs(5);

    struct Server {
        reader: BufReader<OwnedReadHalf>,
        writer: OwnedWriteHalf,
    }

    impl Server {
        async fn send(&mut self, line: &str) {
            self.writer
                .write_all(format!("{line}\r\n").as_bytes())
                .await
                .unwrap();
        }

        async fn recv(&mut self) -> String {
            let mut line = String::new();
            timeout(STEP, self.reader.read_line(&mut line))
                .await
                .expect("engine went quiet")
                .unwrap();
            line.trim_end().to_string()
        }
    }

    /// Start a bot against a local listener and welcome it.
    async fn start(bot: BotConfig) -> (Irc, Server, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut config = Config::new("127.0.0.1", port, "noiler");
        config.identity.channels = vec![
            ChannelConfig::from("#noise"),
            ChannelConfig::Keyed {
                name: "#secret".into(),
                key: Some("hunter2".into()),
            },
        ];
        config.limits.nick_reclaim_secs = 0;

        let client = Client::new(config);
        let irc = client.irc();
        Arc::new(Bot::new(bot).unwrap()).install(&irc);
        let task = tokio::spawn(client.connect());

        let (stream, _) = timeout(STEP, listener.accept()).await.unwrap().unwrap();
        let (read_half, writer) = stream.into_split();
        let mut server = Server {
            reader: BufReader::new(read_half),
            writer,
        };
        assert_eq!(server.recv().await, "NICK noiler");
        server.recv().await;
        server.send(":irc.test 001 noiler :Welcome").await;
        assert_eq!(server.recv().await, "JOIN #noise");
        assert_eq!(server.recv().await, "JOIN #secret hunter2");
        (irc, server, task)
    }

    fn bot_config() -> BotConfig {
        BotConfig {
            owner_password: Some("sit-stay".into()),
            url_titles: false,
            veto_secs: 1,
            ..BotConfig::default()
        }
    }

    async fn stop(irc: Irc, task: JoinHandle<()>) {
        irc.end();
        timeout(STEP, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_time_replies_in_channel_and_query() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":dan!d@h PRIVMSG #noise :!TIME").await;
        let reply = server.recv().await;
        assert!(reply.starts_with("NOTICE #noise :20"), "{reply}");

        server.send(":dan!d@h PRIVMSG noiler :!time").await;
        assert!(server.recv().await.starts_with("NOTICE dan :"));

        stop(irc, task).await;
    }

    #[tokio::test]
    async fn test_help_in_channel() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":dan!d@h PRIVMSG #noise :!help").await;
        assert_eq!(server.recv().await, "NOTICE #noise :Commands:");
        let listing = server.recv().await;
        assert!(listing.contains("!announce or !ann <text>"), "{listing}");
        assert!(!listing.contains("!quit"));

        stop(irc, task).await;
    }

    #[tokio::test]
    async fn test_quit_requires_owner_password() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":dan!d@h PRIVMSG noiler :!quit guess").await;
        assert_eq!(server.recv().await, "NOTICE dan :Nice try.");

        // channel scope does not admit !quit
        server.send(":dan!d@h PRIVMSG #noise :!quit sit-stay").await;
        server.send(":dan!d@h PRIVMSG noiler :!quit sit-stay").await;
        assert_eq!(server.recv().await, "QUIT :Sit. Stay. Good bot.");

        timeout(STEP, task).await.unwrap().unwrap();
        assert_eq!(irc.state(), ConnectionState::Ended);
    }

    #[tokio::test]
    async fn test_announce_goes_out_after_window() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":dan!d@h PRIVMSG #noise :!announce meetup tonight").await;
        assert_eq!(
            server.recv().await,
            "NOTICE #noise :1 seconds to !veto this announcement."
        );
        server.send(":bob!b@h PRIVMSG #noise :!ann another one").await;
        assert_eq!(
            server.recv().await,
            "NOTICE #noise :Hold on, another announcement is pending."
        );

        assert_eq!(
            server.recv().await,
            "PRIVMSG #noise :meetup tonight (via dan)"
        );
        assert_eq!(
            server.recv().await,
            "PRIVMSG #secret :meetup tonight (via dan)"
        );
        assert_eq!(server.recv().await, "NOTICE #noise :Announcement is out.");

        stop(irc, task).await;
    }

    #[tokio::test]
    async fn test_veto_cancels_announcement() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":dan!d@h PRIVMSG #noise :!veto").await;
        assert_eq!(server.recv().await, "NOTICE #noise :Nothing to veto.");

        server.send(":dan!d@h PRIVMSG #noise :!announce oops").await;
        server.recv().await;
        server.send(":bob!b@h PRIVMSG #noise :!veto").await;
        assert_eq!(server.recv().await, "NOTICE #noise :Vetoed.");

        // past the window nothing is announced; the next line is the PONG
        tokio::time::sleep(Duration::from_millis(1500)).await;
        server.send("PING :after").await;
        assert_eq!(server.recv().await, "PONG :after");

        stop(irc, task).await;
    }

    #[tokio::test]
    async fn test_rejoin_after_kick() {
        let (irc, mut server, task) = start(bot_config()).await;

        server.send(":op!o@h KICK #noise someone :bye").await;
        server.send(":op!o@h KICK #secret noiler :bye").await;
        assert_eq!(server.recv().await, "JOIN #secret hunter2");

        stop(irc, task).await;
    }
}
