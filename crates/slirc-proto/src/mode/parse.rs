//! IRC mode parsing.

use crate::error::{MessageParseError, ModeParseError};

use super::types::{ModeChange, ModeSpec, Sign};

/// Decode the arguments of a MODE message that follow the target.
///
/// `pieces[0]` is the mode string (`+o-v+m`), the rest are positional
/// parameters consumed left to right by letters that take one under
/// `spec`. Leftover parameters are ignored; a letter that needs a
/// parameter when none is left is an error. No pieces at all is an empty
/// change list (a bare `MODE #chan` query).
pub fn parse_modes<S: AsRef<str>>(
    pieces: &[S],
    spec: &ModeSpec,
) -> Result<Vec<ModeChange>, MessageParseError> {
    let Some((first, rest)) = pieces.split_first() else {
        return Ok(Vec::new());
    };
    let modestring: &str = first.as_ref();
    let invalid = |cause| MessageParseError::InvalidModeString {
        string: modestring.to_owned(),
        cause,
    };

    let mut chars = modestring.chars();
    let mut sign = match chars.next() {
        Some('+') => Sign::Add,
        Some('-') => Sign::Remove,
        _ => return Err(invalid(ModeParseError::MissingSign)),
    };
    let mut params = rest.iter();

    let mut changes = Vec::new();
    for c in chars {
        match c {
            '+' => sign = Sign::Add,
            '-' => sign = Sign::Remove,
            flag => {
                let param = if spec.takes_param(sign, flag) {
                    let param = params
                        .next()
                        .ok_or_else(|| invalid(ModeParseError::MissingParameter(flag)))?;
                    Some(<S as AsRef<str>>::as_ref(param).to_owned())
                } else {
                    None
                };
                changes.push(ModeChange { sign, flag, param });
            }
        }
    }

    Ok(changes)
}

impl ModeSpec {
    /// Decode mode arguments under this spec. See [`parse_modes`].
    pub fn parse<S: AsRef<str>>(&self, pieces: &[S]) -> Result<Vec<ModeChange>, MessageParseError> {
        parse_modes(pieces, self)
    }
}
