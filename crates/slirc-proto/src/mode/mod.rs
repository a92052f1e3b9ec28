//! Mode string decoding.

mod parse;
mod types;

pub use self::parse::parse_modes;
pub use self::types::{
    ModeChange, ModeSpec, Sign, DEFAULT_PARAM_MODES, DEFAULT_PREFIX_MODES,
    DEFAULT_SET_PARAM_MODES,
};
