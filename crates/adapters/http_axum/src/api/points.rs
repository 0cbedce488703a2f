//! Point read/write for operators and external drivers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use ventmon_app::ports::{ClosureControl, EventPublisher, PointStore};
use ventmon_domain::error::{NotFoundError, ValidationError, VentmonError};
use ventmon_domain::event::ControllerEvent;
use ventmon_domain::point::{PointId, PointValue};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PointResponse {
    pub id: PointId,
    pub value: PointValue,
}

fn point_id(raw: String) -> Result<PointId, ApiError> {
    let id = PointId::new(raw);
    if id.is_empty() {
        return Err(VentmonError::from(ValidationError::EmptyPointId).into());
    }
    Ok(id)
}

/// `GET /api/points/{id}`
pub async fn get<C, P, E>(
    State(state): State<AppState<C, P, E>>,
    Path(id): Path<String>,
) -> Result<Json<PointResponse>, ApiError>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    let id = point_id(id)?;
    let value = state.points.read_point(&id).await?.ok_or_else(|| {
        VentmonError::from(NotFoundError {
            entity: "Point",
            id: id.to_string(),
        })
    })?;
    Ok(Json(PointResponse { id, value }))
}

/// `PUT /api/points/{id}`
///
/// Stores the value and announces the change on the event bus. The
/// controller's own output points are rejected.
pub async fn put<C, P, E>(
    State(state): State<AppState<C, P, E>>,
    Path(id): Path<String>,
    Json(value): Json<PointValue>,
) -> Result<Json<PointResponse>, ApiError>
where
    C: ClosureControl + Send + Sync + 'static,
    P: PointStore + Send + Sync + 'static,
    E: EventPublisher + Send + Sync + 'static,
{
    let id = point_id(id)?;
    if state.control.owns(&id) {
        return Err(VentmonError::from(ValidationError::ReadOnlyPoint(id.to_string())).into());
    }
    state.points.write_point(&id, value.clone()).await?;
    state
        .events
        .publish(ControllerEvent::PointChanged { point: id.clone() })
        .await?;
    tracing::debug!(point = %id, ?value, "point written");
    Ok(Json(PointResponse { id, value }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::router;
    use crate::testing::{json_body, test_state};

    fn put_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_not_found_when_point_was_never_written() {
        let (state, _, _, _) = test_state();
        let response = router::build(state)
            .oneshot(
                Request::builder()
                    .uri("/api/points/bath.window")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["error"],
            "Point bath.window not found"
        );
    }

    #[tokio::test]
    async fn should_store_value_and_publish_change_when_point_is_put() {
        let (state, _, points, events) = test_state();
        let response = router::build(state)
            .oneshot(put_request("/api/points/bath.window", "2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(points.get("bath.window"), Some(PointValue::Int(2)));
        assert_eq!(
            events.events(),
            vec![ControllerEvent::PointChanged {
                point: PointId::new("bath.window")
            }]
        );
    }

    #[tokio::test]
    async fn should_read_back_written_value() {
        let (state, _, _, _) = test_state();
        let app = router::build(state);

        app.clone()
            .oneshot(put_request("/api/points/outdoor.temperature", "-3.5"))
            .await
            .unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/points/outdoor.temperature")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["id"], "outdoor.temperature");
        assert_eq!(json["value"], -3.5);
    }

    #[tokio::test]
    async fn should_reject_blank_point_id() {
        let (state, _, _, events) = test_state();
        let response = router::build(state)
            .oneshot(put_request("/api/points/%20", "true"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(events.events().is_empty());
    }

    #[tokio::test]
    async fn should_reject_write_when_point_is_a_controller_output() {
        let (state, _, points, events) = test_state();
        let response = router::build(state)
            .oneshot(put_request("/api/points/bathroom.trigger_time", "0"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"],
            "point bathroom.trigger_time is published by the controller and cannot be written"
        );
        assert_eq!(points.get("bathroom.trigger_time"), None);
        assert!(events.events().is_empty());
    }
}
