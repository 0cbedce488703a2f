//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod calibration;
#[allow(clippy::missing_errors_doc)]
pub mod controller;
#[allow(clippy::missing_errors_doc)]
pub mod points;

use axum::Router;
use axum::routing::{get, post};

use ventmon_app::ports::{ClosureControl, EventPublisher, PointStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<C, P, E>() -> Router<AppState<C, P, E>>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/status", get(controller::status::<C, P, E>))
        .route("/evaluate", post(controller::evaluate::<C, P, E>))
        .route(
            "/points/{id}",
            get(points::get::<C, P, E>).put(points::put::<C, P, E>),
        )
        .route("/calibration", post(calibration::thermal_resistance))
}
