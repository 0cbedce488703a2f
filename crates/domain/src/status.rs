//! Controller status and the read-only snapshot exposed to operators.

use serde::Serialize;

use crate::closure::ClosureState;
use crate::id::ControllerId;
use crate::step::Step;

/// Whether a controller evaluates at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ControllerStatus {
    Active,
    /// Administratively disabled.
    Inactive,
    /// Blocked until the configuration is fixed.
    InvalidConfig(String),
}

impl ControllerStatus {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Inactive => f.write_str("inactive"),
            Self::InvalidConfig(reason) => write!(f, "invalid configuration: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerSnapshot {
    pub id: ControllerId,
    pub name: String,
    pub status: ControllerStatus,
    pub closure_state: ClosureState,
    /// Unix seconds when the current episode began, 0 when none.
    pub trigger_time: i64,
    pub step: Step,
}
