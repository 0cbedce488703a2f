//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use ventmon_app::ports::{ClosureControl, EventPublisher, PointStore};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// API routes live under `/api`. Every request is traced with
/// [`TraceLayer`] at the `DEBUG` level.
pub fn build<C, P, E>(state: AppState<C, P, E>) -> Router
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::testing::test_state;

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (state, _, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_not_found_when_route_is_unknown() {
        let (state, _, _, _) = test_state();
        let response = build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
