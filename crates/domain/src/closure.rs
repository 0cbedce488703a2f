//! Closure state: whether the monitored opening is closed, tilted or open.

use serde::{Deserialize, Serialize};

/// Closure state derived from the open and tilt predicates.
///
/// The integer encoding (`0` closed, `1` tilted, `2` open) is the value
/// published on the controller's `closure_state` output point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureState {
    #[default]
    Closed,
    Tilted,
    Open,
}

impl ClosureState {
    /// Derive the state from the two predicate outcomes.
    ///
    /// Open takes priority over tilted, tilted over closed.
    #[must_use]
    pub fn from_predicates(open: bool, tilted: bool) -> Self {
        if open {
            Self::Open
        } else if tilted {
            Self::Tilted
        } else {
            Self::Closed
        }
    }

    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Closed => 0,
            Self::Tilted => 1,
            Self::Open => 2,
        }
    }

    /// Decode the output-point encoding. Unknown codes yield `None`.
    #[must_use]
    pub fn from_i64(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Closed),
            1 => Some(Self::Tilted),
            2 => Some(Self::Open),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClosureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::Tilted => f.write_str("tilted"),
            Self::Open => f.write_str("open"),
        }
    }
}
