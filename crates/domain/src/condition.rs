//! Condition: a boolean predicate tree evaluated against live points.
//!
//! The controller treats a condition as opaque: it only asks a
//! `ConditionEvaluator` whether it passes. The tree shape is defined here
//! so that configurations can be serialized and the referenced points
//! can be discovered for change notifications.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::point::{PointId, PointValue};

/// A predicate over point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Requires a point to hold exactly `value`.
    PointIs { point: PointId, value: PointValue },
    /// Requires a numeric point to be strictly greater than `threshold`.
    PointAbove { point: PointId, threshold: f64 },
    /// Requires a numeric point to be strictly less than `threshold`.
    PointBelow { point: PointId, threshold: f64 },
    /// Requires two points to hold equal values.
    PointEqualsPoint { point: PointId, other: PointId },
    /// Requires the current time to be within a window.
    TimeRange {
        /// Start of the window, `HH:MM` in 24-hour format.
        after: String,
        /// End of the window, `HH:MM` in 24-hour format.
        before: String,
    },
    /// Logical AND.
    All { conditions: Vec<Condition> },
    /// Logical OR.
    Any { conditions: Vec<Condition> },
    /// Logical NOT.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Whether the tree carries no predicate at all.
    ///
    /// Empty groups are treated as "no predicate configured" rather than
    /// as a vacuous pass.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::All { conditions } | Self::Any { conditions } => {
                conditions.iter().all(Self::is_empty)
            }
            Self::Not { condition } => condition.is_empty(),
            _ => false,
        }
    }

    /// Collect every point this tree reads, including compared-against points.
    pub fn collect_points(&self, into: &mut BTreeSet<PointId>) {
        match self {
            Self::PointIs { point, .. }
            | Self::PointAbove { point, .. }
            | Self::PointBelow { point, .. } => {
                into.insert(point.clone());
            }
            Self::PointEqualsPoint { point, other } => {
                into.insert(point.clone());
                into.insert(other.clone());
            }
            Self::TimeRange { .. } => {}
            Self::All { conditions } | Self::Any { conditions } => {
                for condition in conditions {
                    condition.collect_points(into);
                }
            }
            Self::Not { condition } => condition.collect_points(into),
        }
    }
}

/// Return the condition only when it actually carries a predicate.
#[must_use]
pub fn configured(condition: Option<&Condition>) -> Option<&Condition> {
    condition.filter(|c| !c.is_empty())
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PointIs { point, value } => write!(f, "{point} == {value}"),
            Self::PointAbove { point, threshold } => write!(f, "{point} > {threshold}"),
            Self::PointBelow { point, threshold } => write!(f, "{point} < {threshold}"),
            Self::PointEqualsPoint { point, other } => write!(f, "{point} == {other}"),
            Self::TimeRange { after, before } => write!(f, "time_range({after}..{before})"),
            Self::All { conditions } => write_group(f, "all", conditions),
            Self::Any { conditions } => write_group(f, "any", conditions),
            Self::Not { condition } => write!(f, "not({condition})"),
        }
    }
}

fn write_group(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    conditions: &[Condition],
) -> std::fmt::Result {
    write!(f, "{name}(")?;
    for (idx, condition) in conditions.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{condition}")?;
    }
    f.write_str(")")
}
