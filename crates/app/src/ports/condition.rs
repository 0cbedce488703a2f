//! Condition evaluator port.

use std::future::Future;

use ventmon_domain::condition::Condition;
use ventmon_domain::error::VentmonError;

/// Decides whether a predicate tree passes against live values.
pub trait ConditionEvaluator {
    fn evaluate(
        &self,
        condition: &Condition,
    ) -> impl Future<Output = Result<bool, VentmonError>> + Send;
}

impl<T: ConditionEvaluator + Send + Sync> ConditionEvaluator for std::sync::Arc<T> {
    fn evaluate(
        &self,
        condition: &Condition,
    ) -> impl Future<Output = Result<bool, VentmonError>> + Send {
        (**self).evaluate(condition)
    }
}
