//! Step store port: durable episode step per controller.

use std::future::Future;

use ventmon_domain::error::VentmonError;
use ventmon_domain::id::ControllerId;
use ventmon_domain::step::Step;

/// Persists the [`Step`] of each controller across restarts.
pub trait StepStore {
    /// Load the last persisted step, `None` if nothing was ever stored.
    fn load(
        &self,
        controller: ControllerId,
    ) -> impl Future<Output = Result<Option<Step>, VentmonError>> + Send;

    /// Replace the persisted step.
    fn persist(
        &self,
        controller: ControllerId,
        step: &Step,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send;
}

impl<T: StepStore + Send + Sync> StepStore for std::sync::Arc<T> {
    fn load(
        &self,
        controller: ControllerId,
    ) -> impl Future<Output = Result<Option<Step>, VentmonError>> + Send {
        (**self).load(controller)
    }

    fn persist(
        &self,
        controller: ControllerId,
        step: &Step,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        (**self).persist(controller, step)
    }
}
