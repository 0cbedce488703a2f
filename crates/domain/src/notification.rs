//! Notification policy: escalation once ventilation outstays its duration.

use serde::{Deserialize, Serialize};

use crate::lowering::ScriptRef;
use crate::time_unit::TimeUnit;

/// Pause between repeated notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatPause {
    pub value: u64,
    #[serde(default)]
    pub unit: TimeUnit,
}

impl RepeatPause {
    #[must_use]
    pub fn seconds(self) -> u64 {
        self.unit.to_seconds(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Action invoked with the controller identity and the target list.
    pub script: ScriptRef,
    /// When set (and non-zero), notifications repeat after this pause until
    /// the episode closes.
    #[serde(default)]
    pub repeat_pause: Option<RepeatPause>,
}

impl NotificationConfig {
    /// Effective repeat pause in seconds, `None` when repeating is off.
    #[must_use]
    pub fn repeat_seconds(&self) -> Option<u64> {
        self.repeat_pause
            .map(RepeatPause::seconds)
            .filter(|secs| *secs > 0)
    }
}
