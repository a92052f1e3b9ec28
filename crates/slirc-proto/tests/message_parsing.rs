//! Integration tests for the parser surface used by clients.

use slirc_proto::{
    split_prefix, LineFramer, Message, MessageParseError, ModeChange, ModeSpec, Response, Sign,
};

#[test]
fn test_privmsg_with_trailing() {
    let msg = Message::parse(":nick!user@host PRIVMSG #chan :hello there").unwrap();
    assert_eq!(msg.prefix.as_deref(), Some("nick!user@host"));
    assert_eq!(msg.command, "PRIVMSG");
    assert_eq!(msg.args, vec!["#chan", "hello there"]);
}

#[test]
fn test_prefix_split() {
    assert_eq!(split_prefix("nick!user@host"), ("nick", "user@host"));
    assert_eq!(
        split_prefix("server.example.org"),
        ("server.example.org", "")
    );
}

#[test]
fn test_prefix_without_command_is_malformed() {
    assert_eq!(
        Message::parse(":irc.example.org"),
        Err(MessageParseError::MissingCommand)
    );
    assert_eq!(Message::parse(""), Err(MessageParseError::EmptyMessage));
}

#[test]
fn test_numeric_reply() {
    let msg =
        Message::parse(":irc.example.org 433 * noiler :Nickname is already in use").unwrap();
    assert_eq!(msg.command, "433");
    assert_eq!(msg.response(), Some(Response::ERR_NICKNAMEINUSE));
    assert_eq!(msg.args, vec!["*", "noiler", "Nickname is already in use"]);
}

#[test]
fn test_lowercase_command_is_uppercased() {
    let msg = Message::parse("ping :abc").unwrap();
    assert_eq!(msg.command, "PING");
}

#[test]
fn test_mode_message_decoding() {
    let msg = Message::parse(":op!o@h MODE #chan +ov-k alice bob secret").unwrap();
    let changes = ModeSpec::default().parse(&msg.args[1..]).unwrap();
    assert_eq!(
        changes,
        vec![
            ModeChange::with_param(Sign::Add, 'o', "alice"),
            ModeChange::with_param(Sign::Add, 'v', "bob"),
            ModeChange::with_param(Sign::Remove, 'k', "secret"),
        ]
    );
}

#[test]
fn test_isupport_changes_mode_decoding() {
    let msg = Message::parse(
        ":irc.example.org 005 noiler CHANMODES=beI,k,lf,imnpst PREFIX=(qov)~@+ :are supported by this server",
    )
    .unwrap();

    let mut spec = ModeSpec::default();
    for token in &msg.args[1..msg.args.len() - 1] {
        spec.apply_isupport(token);
    }

    let changes = spec.parse(&["+qf", "owner", "10:5"]).unwrap();
    assert_eq!(
        changes,
        vec![
            ModeChange::with_param(Sign::Add, 'q', "owner"),
            ModeChange::with_param(Sign::Add, 'f', "10:5"),
        ]
    );
}

#[test]
fn test_framer_into_parser() {
    let mut framer = LineFramer::new();
    let mut parsed = Vec::new();
    for chunk in [&b":a!b@c JOIN #x\r\n:a!b@c PRI"[..], &b"VMSG #x :hi\r\n\r\n"[..]] {
        for line in framer.feed(chunk) {
            if let Ok(msg) = Message::parse(&line.unwrap()) {
                parsed.push(msg);
            }
        }
    }

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].command, "JOIN");
    assert_eq!(parsed[1].args, vec!["#x", "hi"]);
}

#[test]
fn test_serialize_reparses() {
    let msg = Message::new("PRIVMSG", ["#chan", ":)"]).with_prefix("n!u@h");
    let wire = msg.to_string();
    assert_eq!(wire, ":n!u@h PRIVMSG #chan ::)");
    assert_eq!(Message::parse(&wire).unwrap(), msg);
}
