// ── Command domain type ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// The closed set of movement commands the device understands.
///
/// Each variant maps to one fixed lowercase wire token. Parsing accepts the
/// wire token or the English variant name, ignoring ASCII case; nothing
/// else gets through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum CommandKind {
    #[serde(rename = "adelante")]
    #[strum(serialize = "adelante", serialize = "forward")]
    Forward,
    #[serde(rename = "atras")]
    #[strum(serialize = "atras", serialize = "backward")]
    Backward,
    #[serde(rename = "izquierda")]
    #[strum(serialize = "izquierda", serialize = "left")]
    Left,
    #[serde(rename = "derecha")]
    #[strum(serialize = "derecha", serialize = "right")]
    Right,
    #[serde(rename = "stop")]
    #[strum(serialize = "stop")]
    Stop,
}

impl CommandKind {
    /// The token sent as the request body to the device.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Forward => "adelante",
            Self::Backward => "atras",
            Self::Left => "izquierda",
            Self::Right => "derecha",
            Self::Stop => "stop",
        }
    }

    /// Match a raw wire token (as stored by the events service), ignoring
    /// case. English aliases are not wire tokens and do not match here.
    pub fn from_token(raw: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        let raw = raw.trim();
        Self::iter().find(|kind| kind.token().eq_ignore_ascii_case(raw))
    }

    /// Short human label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Forward => "Forward",
            Self::Backward => "Backward",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Stop => "Stop",
        }
    }

    /// Arrow glyph used by list views.
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Forward => "↑",
            Self::Backward => "↓",
            Self::Left => "←",
            Self::Right => "→",
            Self::Stop => "■",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Parse with a domain error instead of `strum::ParseError`.
pub fn parse_command(input: &str) -> Result<CommandKind, crate::error::CoreError> {
    CommandKind::from_str(input.trim()).map_err(|_| crate::error::CoreError::InvalidCommand {
        input: input.to_owned(),
    })
}
