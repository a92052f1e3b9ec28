//! RFC 1459 case mapping.
//!
//! Nicknames and channel names compare case-insensitively, and under
//! `rfc1459` the characters `[]\~` are the uppercase forms of `{}|^`.

/// Lowercase one character under `rfc1459`.
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        'A'..='Z' => c.to_ascii_lowercase(),
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c,
    }
}

/// Lowercase a nick or channel name under `rfc1459`.
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Case-insensitive nick/channel comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .map(irc_lower_char)
            .eq(b.chars().map(irc_lower_char))
}
