//! Reference [`ConditionEvaluator`] reading live values from a [`PointStore`].
//!
//! All points a tree references are read once up front, then the tree is
//! evaluated synchronously against that snapshot. A leaf whose point has
//! no value fails.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveTime;
use ventmon_domain::condition::Condition;
use ventmon_domain::error::VentmonError;
use ventmon_domain::point::{PointId, PointValue};

use crate::ports::{ConditionEvaluator, PointStore};

/// Evaluates condition trees against a point store.
pub struct PointConditionEvaluator<P> {
    points: P,
}

impl<P> PointConditionEvaluator<P>
where
    P: PointStore + Send + Sync,
{
    pub fn new(points: P) -> Self {
        Self { points }
    }

    async fn snapshot(
        &self,
        condition: &Condition,
    ) -> Result<BTreeMap<PointId, PointValue>, VentmonError> {
        let mut ids = BTreeSet::new();
        condition.collect_points(&mut ids);
        let mut values = BTreeMap::new();
        for id in ids {
            if let Some(value) = self.points.read_point(&id).await? {
                values.insert(id, value);
            }
        }
        Ok(values)
    }
}

impl<P> ConditionEvaluator for PointConditionEvaluator<P>
where
    P: PointStore + Send + Sync,
{
    async fn evaluate(&self, condition: &Condition) -> Result<bool, VentmonError> {
        let values = self.snapshot(condition).await?;
        let now = chrono::Local::now().time();
        let passed = evaluate_with(condition, &values, now);
        tracing::debug!(%condition, passed, "condition evaluated");
        Ok(passed)
    }
}

/// Evaluate `condition` against a snapshot of point values.
#[must_use]
pub fn evaluate_with(
    condition: &Condition,
    values: &BTreeMap<PointId, PointValue>,
    now: NaiveTime,
) -> bool {
    match condition {
        Condition::PointIs { point, value } => values
            .get(point)
            .is_some_and(|current| loosely_equal(current, value)),
        Condition::PointAbove { point, threshold } => values
            .get(point)
            .and_then(PointValue::as_f64)
            .is_some_and(|v| v > *threshold),
        Condition::PointBelow { point, threshold } => values
            .get(point)
            .and_then(PointValue::as_f64)
            .is_some_and(|v| v < *threshold),
        Condition::PointEqualsPoint { point, other } => values
            .get(point)
            .zip(values.get(other))
            .is_some_and(|(a, b)| loosely_equal(a, b)),
        Condition::TimeRange { after, before } => in_time_range(after, before, now),
        Condition::All { conditions } => conditions.iter().all(|c| evaluate_with(c, values, now)),
        Condition::Any { conditions } => conditions.iter().any(|c| evaluate_with(c, values, now)),
        Condition::Not { condition } => !evaluate_with(condition, values, now),
    }
}

fn loosely_equal(a: &PointValue, b: &PointValue) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (PointValue::Bool(_), _) | (_, PointValue::Bool(_)) => {
            a.as_bool().zip(b.as_bool()).is_some_and(|(x, y)| x == y)
        }
        _ => match a.as_f64().zip(b.as_f64()) {
            Some((x, y)) => (x - y).abs() < f64::EPSILON,
            None => a.to_string() == b.to_string(),
        },
    }
}

fn in_time_range(after: &str, before: &str, now: NaiveTime) -> bool {
    let parse = |s: &str| NaiveTime::parse_from_str(s.trim(), "%H:%M");
    let (Ok(after), Ok(before)) = (parse(after), parse(before)) else {
        tracing::warn!(after, before, "invalid time range, expected HH:MM");
        return false;
    };
    if after <= before {
        now >= after && now <= before
    } else {
        // overnight window, e.g. 22:00..06:00
        now >= after || now <= before
    }
}
