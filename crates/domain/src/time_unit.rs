//! Time units used by delays, durations and repeat pauses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Seconds per unit.
    #[must_use]
    pub fn multiplier(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 60 * 60,
            Self::Days => 60 * 60 * 24,
        }
    }

    /// Scale `value` of this unit to seconds, saturating on overflow.
    #[must_use]
    pub fn to_seconds(self, value: u64) -> u64 {
        value.saturating_mul(self.multiplier())
    }

    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
            Self::Days => "d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_scale_each_unit_to_seconds() {
        assert_eq!(TimeUnit::Seconds.to_seconds(15), 15);
        assert_eq!(TimeUnit::Minutes.to_seconds(15), 900);
        assert_eq!(TimeUnit::Hours.to_seconds(2), 7200);
        assert_eq!(TimeUnit::Days.to_seconds(1), 86_400);
    }

    #[test]
    fn should_saturate_instead_of_overflowing() {
        assert_eq!(TimeUnit::Days.to_seconds(u64::MAX), u64::MAX);
    }

    #[test]
    fn should_deserialize_lowercase_names() {
        let unit: TimeUnit = serde_json::from_str("\"minutes\"").unwrap();
        assert_eq!(unit, TimeUnit::Minutes);
        assert_eq!(unit.suffix(), "m");
    }
}
