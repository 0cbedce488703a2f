//! Event bus port: publish controller events.

use std::future::Future;

use ventmon_domain::error::VentmonError;
use ventmon_domain::event::ControllerEvent;

/// Publishes controller events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: ControllerEvent,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: ControllerEvent,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        (**self).publish(event)
    }
}
