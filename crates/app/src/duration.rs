//! Duration selection: how long the current ventilation episode may last.

use ventmon_domain::closure::ClosureState;
use ventmon_domain::condition::configured;
use ventmon_domain::duration::{DurationPolicy, DurationRule};
use ventmon_domain::point::{PointId, PointValue};

use crate::ports::{ConditionEvaluator, PointStore};

/// Picks a ventilation duration from an ordered rule list.
///
/// Read and evaluation failures never abort the selection: an unreadable
/// temperature counts as "no sensor" and a failing condition as "not
/// passing".
pub struct DurationSelector<'a, P, C> {
    policy: &'a DurationPolicy,
    outside_temperature: Option<&'a PointId>,
    points: &'a P,
    conditions: &'a C,
}

impl<'a, P, C> DurationSelector<'a, P, C>
where
    P: PointStore + Sync,
    C: ConditionEvaluator + Sync,
{
    pub fn new(
        policy: &'a DurationPolicy,
        outside_temperature: Option<&'a PointId>,
        points: &'a P,
        conditions: &'a C,
    ) -> Self {
        Self {
            policy,
            outside_temperature,
            points,
            conditions,
        }
    }

    /// Duration in seconds granted for `state`; 0 when no rule exists.
    pub async fn select(&self, state: ClosureState) -> u64 {
        let temperature = self.read_temperature().await;
        for (index, rule) in self.policy.rules.iter().enumerate() {
            if self.passes(rule, temperature).await {
                let seconds = self.policy.seconds(rule, state);
                tracing::debug!(rule = index, %state, seconds, "duration rule matched");
                return seconds;
            }
        }
        match self.policy.fallback() {
            Some(rule) => {
                let seconds = self.policy.seconds(rule, state);
                tracing::debug!(%state, seconds, ?temperature, "no duration rule matched, using first rule");
                seconds
            }
            None => 0,
        }
    }

    async fn passes(&self, rule: &DurationRule, temperature: Option<f64>) -> bool {
        if !rule.admits_temperature(temperature) {
            return false;
        }
        let Some(condition) = configured(rule.condition.as_ref()) else {
            return true;
        };
        match self.conditions.evaluate(condition).await {
            Ok(passed) => passed,
            Err(err) => {
                tracing::warn!(%err, %condition, "duration rule condition failed to evaluate");
                false
            }
        }
    }

    async fn read_temperature(&self) -> Option<f64> {
        let point = self.outside_temperature?;
        match self.points.read_point(point).await {
            Ok(value) => value.as_ref().and_then(PointValue::as_f64),
            Err(err) => {
                tracing::warn!(%err, %point, "failed to read outside temperature");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ventmon_domain::condition::Condition;
    use ventmon_domain::time_unit::TimeUnit;

    use super::*;
    use crate::condition_evaluator::PointConditionEvaluator;
    use crate::testing::MemoryPoints;

    fn rule(max: f64, open: u64, tilt: u64) -> DurationRule {
        DurationRule {
            max_temperature: max,
            condition: None,
            open_duration: open,
            tilt_duration: tilt,
        }
    }

    fn policy(rules: Vec<DurationRule>) -> DurationPolicy {
        DurationPolicy {
            time_unit: TimeUnit::Minutes,
            rules,
        }
    }

    #[tokio::test]
    async fn should_return_zero_when_rule_list_is_empty() {
        let points = Arc::new(MemoryPoints::default());
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let policy = DurationPolicy::default();
        let selector = DurationSelector::new(&policy, None, &points, &conditions);

        assert_eq!(selector.select(ClosureState::Open).await, 0);
    }

    #[tokio::test]
    async fn should_use_single_rule_when_no_temperature_sensor_is_configured() {
        let points = Arc::new(MemoryPoints::default());
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let policy = policy(vec![rule(-50.0, 5, 15)]);
        let selector = DurationSelector::new(&policy, None, &points, &conditions);

        assert_eq!(selector.select(ClosureState::Open).await, 300);
        assert_eq!(selector.select(ClosureState::Tilted).await, 900);
    }

    #[tokio::test]
    async fn should_pick_first_rule_admitting_temperature() {
        let points = Arc::new(MemoryPoints::with(&[(
            "outside.temperature",
            PointValue::Float(12.0),
        )]));
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let policy = policy(vec![rule(0.0, 5, 10), rule(15.0, 10, 20), rule(30.0, 20, 40)]);
        let outside = PointId::new("outside.temperature");
        let selector = DurationSelector::new(&policy, Some(&outside), &points, &conditions);

        assert_eq!(selector.select(ClosureState::Open).await, 600);
    }

    #[tokio::test]
    async fn should_fall_back_to_first_rule_when_nothing_matches() {
        let points = Arc::new(MemoryPoints::with(&[(
            "outside.temperature",
            PointValue::Float(35.0),
        )]));
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let policy = policy(vec![rule(0.0, 5, 10), rule(30.0, 20, 40)]);
        let outside = PointId::new("outside.temperature");
        let selector = DurationSelector::new(&policy, Some(&outside), &points, &conditions);

        assert_eq!(selector.select(ClosureState::Tilted).await, 600);
    }

    #[tokio::test]
    async fn should_skip_rule_when_its_condition_fails() {
        let points = Arc::new(MemoryPoints::with(&[("home.away", PointValue::Bool(false))]));
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let mut gated = rule(40.0, 1, 1);
        gated.condition = Some(Condition::PointIs {
            point: PointId::new("home.away"),
            value: PointValue::Bool(true),
        });
        let policy = policy(vec![gated, rule(40.0, 30, 60)]);
        let selector = DurationSelector::new(&policy, None, &points, &conditions);

        assert_eq!(selector.select(ClosureState::Open).await, 1800);

        points.set("home.away", PointValue::Bool(true));
        assert_eq!(selector.select(ClosureState::Open).await, 60);
    }

    #[tokio::test]
    async fn should_ignore_temperature_gate_when_sensor_has_no_value() {
        let points = Arc::new(MemoryPoints::default());
        let conditions = PointConditionEvaluator::new(Arc::clone(&points));
        let policy = policy(vec![rule(-20.0, 2, 4)]);
        let outside = PointId::new("outside.temperature");
        let selector = DurationSelector::new(&policy, Some(&outside), &points, &conditions);

        assert_eq!(selector.select(ClosureState::Open).await, 120);
    }
}
