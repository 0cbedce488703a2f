//! Controller status and the manual evaluation trigger.

use axum::Json;
use axum::extract::State;

use ventmon_app::ports::{ClosureControl, EventPublisher, Outcome, PointStore};
use ventmon_domain::status::ControllerSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/status`
pub async fn status<C, P, E>(
    State(state): State<AppState<C, P, E>>,
) -> Result<Json<ControllerSnapshot>, ApiError>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    let snapshot = state.control.snapshot().await?;
    Ok(Json(snapshot))
}

/// `POST /api/evaluate`
///
/// Runs one evaluation synchronously and returns its outcome.
pub async fn evaluate<C, P, E>(
    State(state): State<AppState<C, P, E>>,
) -> Result<Json<Outcome>, ApiError>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    let outcome = state.control.evaluate().await?;
    tracing::info!(?outcome, "manual evaluation");
    Ok(Json(outcome))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use crate::router;
    use crate::testing::{json_body, test_state};

    #[tokio::test]
    async fn should_return_snapshot_when_status_requested() {
        let (state, control, _, _) = test_state();
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["id"], control.id.to_string());
        assert_eq!(json["name"], "bathroom");
        assert_eq!(json["status"]["status"], "active");
        assert_eq!(json["closure_state"], "tilted");
        assert_eq!(json["trigger_time"], 1_700_000_000);
        assert_eq!(json["step"]["step"], "delay");
    }

    #[tokio::test]
    async fn should_evaluate_once_when_manual_trigger_posted() {
        let (state, control, _, _) = test_state();
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/evaluate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(control.evaluations.load(Ordering::SeqCst), 1);
        let json = json_body(response).await;
        assert_eq!(json["outcome"], "evaluated");
        assert_eq!(json["closure_state"], "open");
    }

    #[tokio::test]
    async fn should_report_busy_when_controller_is_locked() {
        let (state, control, _, _) = test_state();
        *control.outcome.lock().unwrap() = ventmon_app::ports::Outcome::Busy;

        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/evaluate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(json_body(response).await["outcome"], "busy");
    }
}
