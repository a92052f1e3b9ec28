//! Mode change types and parameter rules.
//!
//! # Reference
//! - RFC 2812 Section 3.2.3 (Channel Modes)
//! - Modern IRC documentation, RPL_ISUPPORT `CHANMODES` and `PREFIX`

use std::fmt;

/// Direction of a mode change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    /// `+`
    Add,
    /// `-`
    Remove,
}

impl Sign {
    /// The wire character for this sign.
    pub fn as_char(self) -> char {
        match self {
            Sign::Add => '+',
            Sign::Remove => '-',
        }
    }
}

/// A single decoded mode change, e.g. `+o nick` or `-m`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    /// Whether the flag is being set or unset.
    pub sign: Sign,
    /// The mode letter.
    pub flag: char,
    /// Parameter consumed for this letter, if it takes one.
    pub param: Option<String>,
}

impl ModeChange {
    /// Create a change with no parameter.
    pub fn new(sign: Sign, flag: char) -> Self {
        Self {
            sign,
            flag,
            param: None,
        }
    }

    /// Create a change carrying a parameter.
    pub fn with_param(sign: Sign, flag: char, param: impl Into<String>) -> Self {
        Self {
            sign,
            flag,
            param: Some(param.into()),
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign.as_char(), self.flag)?;
        if let Some(ref param) = self.param {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

/// Which mode letters consume a positional parameter.
///
/// Letters in `always` (list modes, keys, and membership prefixes) take one
/// for both `+` and `-`; letters in `set_only` (like the user limit `l`)
/// take one only when being set. Everything else takes none.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeSpec {
    always: Vec<char>,
    set_only: Vec<char>,
    prefix: Vec<char>,
}

/// Default channel letters taking a parameter for both signs.
pub const DEFAULT_PARAM_MODES: &str = "beIk";
/// Default channel letters taking a parameter only when set.
pub const DEFAULT_SET_PARAM_MODES: &str = "l";
/// Default membership prefix letters (`PREFIX=(ohv)@%+`).
pub const DEFAULT_PREFIX_MODES: &str = "ohv";

impl Default for ModeSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PARAM_MODES, DEFAULT_SET_PARAM_MODES)
            .with_prefix_modes(DEFAULT_PREFIX_MODES)
    }
}

impl ModeSpec {
    /// Build a spec from explicit letter sets.
    pub fn new(always: &str, set_only: &str) -> Self {
        Self {
            always: always.chars().collect(),
            set_only: set_only.chars().collect(),
            prefix: Vec::new(),
        }
    }

    /// A spec where no letter takes a parameter (user modes).
    pub fn none() -> Self {
        Self::new("", "")
    }

    /// Replace the membership prefix letters.
    #[must_use]
    pub fn with_prefix_modes(mut self, letters: &str) -> Self {
        self.prefix = letters.chars().collect();
        self
    }

    /// Whether `flag` consumes a parameter under `sign`.
    pub fn takes_param(&self, sign: Sign, flag: char) -> bool {
        self.prefix.contains(&flag)
            || self.always.contains(&flag)
            || (sign == Sign::Add && self.set_only.contains(&flag))
    }

    /// Update from one `RPL_ISUPPORT` token.
    ///
    /// Understands `CHANMODES=A,B,C,D` (A and B always take a parameter, C
    /// only when set) and `PREFIX=(modes)symbols`. Returns whether the
    /// token was recognised and applied.
    pub fn apply_isupport(&mut self, token: &str) -> bool {
        let Some((key, value)) = token.split_once('=') else {
            return false;
        };

        match key {
            "CHANMODES" => {
                let mut groups = value.split(',');
                let list = groups.next().unwrap_or("");
                let always = groups.next().unwrap_or("");
                let set_only = groups.next().unwrap_or("");
                self.always = list.chars().chain(always.chars()).collect();
                self.set_only = set_only.chars().collect();
                true
            }
            "PREFIX" => {
                let Some(modes) = value
                    .strip_prefix('(')
                    .and_then(|v| v.split_once(')'))
                    .map(|(modes, _)| modes)
                else {
                    return false;
                };
                self.prefix = modes.chars().collect();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec() {
        let spec = ModeSpec::default();
        assert!(spec.takes_param(Sign::Add, 'o'));
        assert!(spec.takes_param(Sign::Remove, 'v'));
        assert!(spec.takes_param(Sign::Remove, 'b'));
        assert!(spec.takes_param(Sign::Add, 'k'));
        assert!(spec.takes_param(Sign::Add, 'l'));
        assert!(!spec.takes_param(Sign::Remove, 'l'));
        assert!(!spec.takes_param(Sign::Add, 'm'));
        assert!(!spec.takes_param(Sign::Add, 'i'));
    }

    #[test]
    fn test_none_spec() {
        let spec = ModeSpec::none();
        assert!(!spec.takes_param(Sign::Add, 'o'));
    }

    #[test]
    fn test_apply_chanmodes() {
        let mut spec = ModeSpec::default();
        assert!(spec.apply_isupport("CHANMODES=beIq,k,flj,CimnpstTz"));
        assert!(spec.takes_param(Sign::Remove, 'q'));
        assert!(spec.takes_param(Sign::Add, 'f'));
        assert!(!spec.takes_param(Sign::Remove, 'j'));
        assert!(!spec.takes_param(Sign::Add, 'T'));
        // prefix letters are untouched
        assert!(spec.takes_param(Sign::Add, 'o'));
    }

    #[test]
    fn test_apply_prefix() {
        let mut spec = ModeSpec::default();
        assert!(spec.apply_isupport("PREFIX=(qaohv)~&@%+"));
        assert!(spec.takes_param(Sign::Add, 'q'));
        assert!(spec.takes_param(Sign::Remove, 'a'));
    }

    #[test]
    fn test_apply_unrelated_token() {
        let mut spec = ModeSpec::default();
        assert!(!spec.apply_isupport("NETWORK=Example"));
        assert!(!spec.apply_isupport("EXCEPTS"));
        assert!(!spec.apply_isupport("PREFIX=broken"));
        assert_eq!(spec, ModeSpec::default());
    }

    #[test]
    fn test_display() {
        assert_eq!(ModeChange::with_param(Sign::Add, 'o', "dan").to_string(), "+o dan");
        assert_eq!(ModeChange::new(Sign::Remove, 'm').to_string(), "-m");
    }
}
