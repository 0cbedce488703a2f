//! Driving port: what the outside world may ask of a controller.

use std::future::Future;

use serde::Serialize;
use ventmon_domain::closure::ClosureState;
use ventmon_domain::error::VentmonError;
use ventmon_domain::point::PointId;
use ventmon_domain::status::ControllerSnapshot;

/// Result of one guarded entry into the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Disabled or invalid configuration; nothing was evaluated.
    Inactive,
    /// Another evaluation held the lock for the whole wait.
    Busy,
    Evaluated { closure_state: ClosureState },
}

/// Entry points of the closure-state machine.
pub trait ClosureControl {
    /// Re-evaluate the closure state now.
    fn evaluate(&self) -> impl Future<Output = Result<Outcome, VentmonError>> + Send;

    /// Continue the episode after the timer elapsed.
    fn on_timer_fire(&self) -> impl Future<Output = Result<Outcome, VentmonError>> + Send;

    /// Current observable state.
    fn snapshot(&self) -> impl Future<Output = Result<ControllerSnapshot, VentmonError>> + Send;

    /// Whether a change of `point` must trigger an evaluation.
    fn watches(&self, point: &PointId) -> bool;

    /// Whether `point` is an output of the controller, read-only to others.
    fn owns(&self, point: &PointId) -> bool;
}

impl<T: ClosureControl + Send + Sync> ClosureControl for std::sync::Arc<T> {
    fn evaluate(&self) -> impl Future<Output = Result<Outcome, VentmonError>> + Send {
        (**self).evaluate()
    }

    fn on_timer_fire(&self) -> impl Future<Output = Result<Outcome, VentmonError>> + Send {
        (**self).on_timer_fire()
    }

    fn snapshot(&self) -> impl Future<Output = Result<ControllerSnapshot, VentmonError>> + Send {
        (**self).snapshot()
    }

    fn watches(&self, point: &PointId) -> bool {
        (**self).watches(point)
    }

    fn owns(&self, point: &PointId) -> bool {
        (**self).owns(point)
    }
}
