//! Handlers the engine registers on itself.
//!
//! All of them return `false` so user handlers still see the same events.

use std::time::Duration;

use slirc_proto::irc_eq;
use tracing::{debug, info, warn};

use super::{ConnectionState, Irc};
use crate::event::Event;

/// Scheduler slot used to retry the preferred nick.
pub const NICK_RECLAIM_SLOT: &str = "nick-reclaim";

pub(super) fn register(irc: &Irc) {
    irc.on("RPL_WELCOME", on_welcome);
    irc.on("NICK", on_nick);
    irc.on("ERR_NICKNAMEINUSE", on_nick_in_use);
    irc.on("RPL_ISUPPORT", on_isupport);
}

/// Adopt the nick the server registered us with and join channels.
fn on_welcome(irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
    if let Some(nick) = event.message.arg(0) {
        irc.set_nick(nick);
    }

    for channel in &irc.config().identity.channels {
        irc.join(channel.name(), channel.key());
    }
    irc.set_state(ConnectionState::Joined);
    info!(nick = %irc.current_nick(), "Registered");
    Ok(false)
}

fn on_nick(irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
    if let (Some(old), Some(new)) = (event.nick, event.message.arg(0))
        && irc_eq(old, &irc.current_nick())
    {
        info!(old, new, "Nick changed");
        irc.set_nick(new);
    }
    Ok(false)
}

/// During registration pick another nick right away; in every case try the
/// preferred nick again later.
fn on_nick_in_use(irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
    let Some(rejected) = event.message.arg(1) else {
        return Ok(false);
    };

    if irc.state() == ConnectionState::Registering {
        let identity = &irc.config().identity;
        let next = if irc_eq(rejected, &identity.nick) {
            identity.alt_nick()
        } else {
            format!("{rejected}_")
        };
        warn!(rejected, next = %next, "Nick in use");
        irc.set_nick(&next);
        irc.nick(&next);
    } else {
        debug!(rejected, "Nick change refused");
    }

    schedule_reclaim(irc);
    Ok(false)
}

fn schedule_reclaim(irc: &Irc) {
    let secs = irc.config().limits.nick_reclaim_secs;
    if secs == 0 {
        return;
    }

    let scheduled = irc.schedule_deferred(NICK_RECLAIM_SLOT, Duration::from_secs(secs), |irc| {
        let preferred = &irc.config().identity.nick;
        let connected = matches!(
            irc.state(),
            ConnectionState::Registering | ConnectionState::Joined
        );
        if connected && !irc_eq(&irc.current_nick(), preferred) {
            info!(nick = %preferred, "Reclaiming preferred nick");
            irc.nick(preferred);
        }
    });
    if let Err(busy) = scheduled {
        debug!(%busy, "Nick reclaim already pending");
    }
}

/// Pick up `CHANMODES` and `PREFIX` so channel modes decode correctly.
fn on_isupport(irc: &Irc, event: &Event<'_>) -> anyhow::Result<bool> {
    let args = &event.message.args;
    // <nick> <token>... :are supported by this server
    let Some(tokens) = args.get(1..args.len().saturating_sub(1)) else {
        return Ok(false);
    };

    let mut spec = irc.inner.mode_spec.write();
    for token in tokens {
        if spec.apply_isupport(token) {
            debug!(token = %token, "Mode parameters updated");
        }
    }
    Ok(false)
}
