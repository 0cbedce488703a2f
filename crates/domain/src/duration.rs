//! Duration rules: how long ventilation may last before a notification.
//!
//! Rules are ordered. Each rule is gated by an inclusive upper bound on the
//! outdoor temperature and optionally by a condition. The first rule that
//! passes supplies the duration for the current closure state.

use serde::{Deserialize, Serialize};

use crate::closure::ClosureState;
use crate::condition::Condition;
use crate::time_unit::TimeUnit;

/// One temperature/condition-gated entry of the duration list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRule {
    /// Inclusive upper bound on the outdoor temperature in °C.
    pub max_temperature: f64,
    /// Optional extra gate.
    #[serde(default)]
    pub condition: Option<Condition>,
    /// Allowed duration while fully open, in the policy's time unit.
    pub open_duration: u64,
    /// Allowed duration while tilted, in the policy's time unit.
    pub tilt_duration: u64,
}

impl DurationRule {
    /// Whether the temperature gate admits `outside_temperature`.
    ///
    /// Without a temperature reading the gate is vacuously open.
    #[must_use]
    pub fn admits_temperature(&self, outside_temperature: Option<f64>) -> bool {
        outside_temperature.is_none_or(|t| t <= self.max_temperature)
    }

    /// Duration value for `state`, unscaled. Closed episodes have none.
    #[must_use]
    pub fn duration_value(&self, state: ClosureState) -> u64 {
        match state {
            ClosureState::Open => self.open_duration,
            ClosureState::Tilted => self.tilt_duration,
            ClosureState::Closed => 0,
        }
    }
}

/// Ordered duration rules sharing one time unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationPolicy {
    pub time_unit: TimeUnit,
    pub rules: Vec<DurationRule>,
}

impl DurationPolicy {
    /// Scaled duration in seconds that `rule` grants for `state`.
    #[must_use]
    pub fn seconds(&self, rule: &DurationRule, state: ClosureState) -> u64 {
        self.time_unit.to_seconds(rule.duration_value(state))
    }

    /// Rule used when no rule passes: the first one, if any.
    #[must_use]
    pub fn fallback(&self) -> Option<&DurationRule> {
        self.rules.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(max: f64, open: u64, tilt: u64) -> DurationRule {
        DurationRule {
            max_temperature: max,
            condition: None,
            open_duration: open,
            tilt_duration: tilt,
        }
    }

    #[test]
    fn should_admit_temperature_on_inclusive_bound() {
        assert!(rule(10.0, 1, 1).admits_temperature(Some(10.0)));
        assert!(!rule(10.0, 1, 1).admits_temperature(Some(10.1)));
    }

    #[test]
    fn should_admit_any_temperature_when_no_reading() {
        assert!(rule(-40.0, 1, 1).admits_temperature(None));
    }

    #[test]
    fn should_pick_value_by_closure_state() {
        let r = rule(0.0, 5, 15);
        assert_eq!(r.duration_value(ClosureState::Open), 5);
        assert_eq!(r.duration_value(ClosureState::Tilted), 15);
        assert_eq!(r.duration_value(ClosureState::Closed), 0);
    }

    #[test]
    fn should_scale_by_policy_time_unit() {
        let policy = DurationPolicy {
            time_unit: TimeUnit::Minutes,
            rules: vec![rule(0.0, 5, 15)],
        };
        assert_eq!(policy.seconds(&policy.rules[0], ClosureState::Tilted), 900);
    }

    #[test]
    fn should_fall_back_to_first_rule() {
        let policy = DurationPolicy {
            time_unit: TimeUnit::Seconds,
            rules: vec![rule(0.0, 1, 2), rule(30.0, 3, 4)],
        };
        assert_eq!(policy.fallback().map(|r| r.open_duration), Some(1));
        assert!(DurationPolicy::default().fallback().is_none());
    }
}
