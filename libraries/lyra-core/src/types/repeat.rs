/// Repeat mode for playback
use crate::error::LyraError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repeat mode
///
/// `One` only governs what happens when a track ends on its own; explicit
/// skips still move through the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// All modes in cycle order
    pub const CYCLE: [RepeatMode; 3] = [RepeatMode::Off, RepeatMode::All, RepeatMode::One];

    /// Next mode in the `off -> all -> one -> off` cycle
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// Whether skipping past either end of the queue wraps around
    pub fn wraps(self) -> bool {
        self != Self::Off
    }

    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::All => "all",
            Self::One => "one",
        }
    }
}

impl FromStr for RepeatMode {
    type Err = LyraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "all" | "queue" => Ok(Self::All),
            "one" | "track" => Ok(Self::One),
            other => Err(LyraError::invalid_input(format!(
                "unknown repeat mode '{other}' (expected off, all or one)"
            ))),
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
