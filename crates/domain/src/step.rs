//! Episode step: the persisted sub-state of a ventilation episode.
//!
//! The step is the only state that must survive restarts. It is stored as
//! a JSON blob after every transition.

use serde::{Deserialize, Serialize};

use crate::point::SavedValues;

/// Where the current episode stands.
///
/// ```text
/// Idle --(open/tilt, delay>0)--> Delay --(timer)--> Lowered
/// Lowered --(timer, duration elapsed)--> Notified --(timer, repeat)--> Notified
/// any --(closed)--> Idle
/// ```
///
/// Captured actuator values only exist in the lowered phases, so a
/// `Notified` step without its save-map cannot be expressed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    #[default]
    Idle,
    /// Waiting for the debounce delay to elapse.
    Delay,
    /// Targets are lowered; the ventilation duration is running.
    Lowered {
        #[serde(default)]
        saved: SavedValues,
    },
    /// The duration elapsed and a notification was raised.
    Notified {
        #[serde(default)]
        saved: SavedValues,
        #[serde(default)]
        repetitions: u32,
    },
}

impl Step {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether targets have been lowered in this episode.
    #[must_use]
    pub fn is_lowered(&self) -> bool {
        matches!(self, Self::Lowered { .. } | Self::Notified { .. })
    }

    /// Captured pre-lowering values (empty outside the lowered phases).
    #[must_use]
    pub fn saved_values(&self) -> Option<&SavedValues> {
        match self {
            Self::Lowered { saved } | Self::Notified { saved, .. } => Some(saved),
            Self::Idle | Self::Delay => None,
        }
    }

    /// Consume the step and return its save-map (empty when none).
    #[must_use]
    pub fn into_saved_values(self) -> SavedValues {
        match self {
            Self::Lowered { saved } | Self::Notified { saved, .. } => saved,
            Self::Idle | Self::Delay => SavedValues::new(),
        }
    }

    #[must_use]
    pub fn repetition_count(&self) -> u32 {
        match self {
            Self::Notified { repetitions, .. } => *repetitions,
            _ => 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Delay => "delay",
            Self::Lowered { .. } => "lowered",
            Self::Notified { .. } => "notified",
        }
    }
}
