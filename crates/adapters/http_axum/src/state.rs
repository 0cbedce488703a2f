//! Shared application state for axum handlers.

use std::sync::Arc;

use ventmon_app::ports::{ClosureControl, EventPublisher, PointStore};

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`.
pub struct AppState<C, P, E> {
    /// The controller driven by the operator endpoints.
    pub control: Arc<C>,
    /// Point store backing `/api/points`.
    pub points: Arc<P>,
    /// Bus notified when an operator writes a point.
    pub events: Arc<E>,
}

impl<C, P, E> Clone for AppState<C, P, E> {
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
            points: Arc::clone(&self.points),
            events: Arc::clone(&self.events),
        }
    }
}

impl<C, P, E> AppState<C, P, E>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    pub fn new(control: C, points: P, events: E) -> Self {
        Self::from_arcs(Arc::new(control), Arc::new(points), Arc::new(events))
    }

    /// Create the state from handles that are shared with background tasks.
    pub fn from_arcs(control: Arc<C>, points: Arc<P>, events: Arc<E>) -> Self {
        Self {
            control,
            points,
            events,
        }
    }
}
