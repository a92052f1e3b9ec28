//! Built-in triggers.

use std::time::Duration;

use slirc_client::Irc;
use slirc_proto::irc_eq;
use tracing::info;

use super::{Invocation, Scope, Trigger, Usage, help_details, help_listing};
use crate::bot::Bot;

/// Scheduler slot holding the pending announcement.
const ANNOUNCE_SLOT: &str = "announce";

pub fn builtin_table() -> Vec<Trigger> {
    vec![
        Trigger {
            triggers: &["!info"],
            usage: None,
            scope: Scope::Channel,
            handler: info,
        },
        Trigger {
            triggers: &["!help"],
            usage: Some(Usage {
                args: "",
                description: "This list",
            }),
            scope: Scope::Both,
            handler: help,
        },
        Trigger {
            triggers: &["!announce", "!ann"],
            usage: Some(Usage {
                args: "<text>",
                description: "Announce <text> in every channel unless vetoed",
            }),
            scope: Scope::Channel,
            handler: announce,
        },
        Trigger {
            triggers: &["!veto"],
            usage: Some(Usage {
                args: "",
                description: "Stop the pending announcement",
            }),
            scope: Scope::Channel,
            handler: veto,
        },
        Trigger {
            triggers: &["!time"],
            usage: Some(Usage {
                args: "",
                description: "Local system time",
            }),
            scope: Scope::Both,
            handler: time,
        },
        Trigger {
            triggers: &["!quit"],
            usage: Some(Usage {
                args: "<owner-password>",
                description: "Disconnect and exit",
            }),
            scope: Scope::Query,
            handler: quit,
        },
    ]
}

fn info(bot: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    irc.notice(inv.target, &bot.config().info_text);
    Ok(true)
}

fn help(bot: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    let to = inv.reply_to();
    irc.notice(to, "Commands:");
    if inv.in_channel() {
        irc.notice(to, &help_listing(bot.triggers(), true));
    } else {
        for line in help_details(bot.triggers()) {
            irc.notice(to, &line);
        }
    }
    Ok(true)
}

fn time(_: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
    irc.notice(inv.reply_to(), &now);
    Ok(true)
}

/// Hold the announcement for the veto window, then post it to every
/// configured channel and the one it was requested in.
fn announce(bot: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    let Some(text) = inv.args else {
        irc.notice(inv.target, "Announce what?");
        return Ok(true);
    };

    let window = bot.config().veto_secs;
    let origin = inv.target.to_string();
    let line = format!("{text} (via {})", inv.nick);

    let scheduled = irc.schedule_deferred(ANNOUNCE_SLOT, Duration::from_secs(window), move |irc| {
        let mut targets: Vec<String> = irc
            .config()
            .identity
            .channels
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        if !targets.iter().any(|t| irc_eq(t, &origin)) {
            targets.push(origin.clone());
        }
        for target in &targets {
            irc.privmsg(target, &line);
        }
        info!(channels = targets.len(), "Announcement sent");
        irc.notice(&origin, "Announcement is out.");
    });

    match scheduled {
        Ok(_) => irc.notice(
            inv.target,
            &format!("{window} seconds to !veto this announcement."),
        ),
        Err(_) => irc.notice(inv.target, "Hold on, another announcement is pending."),
    }
    Ok(true)
}

fn veto(_: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    if irc.scheduler().cancel_slot(ANNOUNCE_SLOT) {
        info!(nick = inv.nick, "Announcement vetoed");
        irc.notice(inv.target, "Vetoed.");
    } else {
        irc.notice(inv.target, "Nothing to veto.");
    }
    Ok(true)
}

fn quit(bot: &Bot, irc: &Irc, inv: &Invocation<'_>) -> anyhow::Result<bool> {
    let authorised = matches!(
        (bot.config().owner_password.as_deref(), inv.args),
        (Some(expected), Some(given)) if expected == given
    );
    if authorised {
        info!(nick = inv.nick, userhost = inv.userhost, "Quit requested by owner");
        irc.quit(Some("Sit. Stay. Good bot."));
    } else {
        irc.notice(inv.nick, "Nice try.");
    }
    Ok(true)
}
