use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::response::Response;
use http_body_util::BodyExt;
use ventmon_app::ports::{ClosureControl, EventPublisher, Outcome, PointStore};
use ventmon_domain::closure::ClosureState;
use ventmon_domain::config::ControllerConfig;
use ventmon_domain::error::VentmonError;
use ventmon_domain::event::ControllerEvent;
use ventmon_domain::id::ControllerId;
use ventmon_domain::point::{PointId, PointValue};
use ventmon_domain::status::{ControllerSnapshot, ControllerStatus};
use ventmon_domain::step::Step;

use crate::state::AppState;

pub(crate) struct StubControl {
    pub id: ControllerId,
    pub evaluations: AtomicUsize,
    pub outcome: Mutex<Outcome>,
}

impl Default for StubControl {
    fn default() -> Self {
        Self {
            id: ControllerId::from_name("bathroom"),
            evaluations: AtomicUsize::new(0),
            outcome: Mutex::new(Outcome::Evaluated {
                closure_state: ClosureState::Open,
            }),
        }
    }
}

impl ClosureControl for StubControl {
    async fn evaluate(&self) -> Result<Outcome, VentmonError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        Ok(*self.outcome.lock().unwrap())
    }

    async fn on_timer_fire(&self) -> Result<Outcome, VentmonError> {
        Ok(*self.outcome.lock().unwrap())
    }

    async fn snapshot(&self) -> Result<ControllerSnapshot, VentmonError> {
        Ok(ControllerSnapshot {
            id: self.id,
            name: "bathroom".to_string(),
            status: ControllerStatus::Active,
            closure_state: ClosureState::Tilted,
            trigger_time: 1_700_000_000,
            step: Step::Delay,
        })
    }

    fn watches(&self, _point: &PointId) -> bool {
        true
    }

    fn owns(&self, point: &PointId) -> bool {
        ControllerConfig {
            name: "bathroom".to_string(),
            ..ControllerConfig::default()
        }
        .is_output_point(point)
    }
}

#[derive(Default)]
pub(crate) struct StubPoints(Mutex<BTreeMap<PointId, PointValue>>);

impl StubPoints {
    pub fn get(&self, id: &str) -> Option<PointValue> {
        self.0.lock().unwrap().get(&PointId::new(id)).cloned()
    }
}

impl PointStore for StubPoints {
    async fn read_point(&self, id: &PointId) -> Result<Option<PointValue>, VentmonError> {
        Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn write_point(&self, id: &PointId, value: PointValue) -> Result<(), VentmonError> {
        self.0.lock().unwrap().insert(id.clone(), value);
        Ok(())
    }

    async fn request_actuation(&self, id: &PointId, value: PointValue) -> Result<(), VentmonError> {
        self.write_point(id, value).await
    }
}

#[derive(Default)]
pub(crate) struct RecordingPublisher(Mutex<Vec<ControllerEvent>>);

impl RecordingPublisher {
    pub fn events(&self) -> Vec<ControllerEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: ControllerEvent) -> Result<(), VentmonError> {
        self.0.lock().unwrap().push(event);
        Ok(())
    }
}

pub(crate) type TestState = AppState<StubControl, StubPoints, RecordingPublisher>;

pub(crate) fn test_state() -> (
    TestState,
    Arc<StubControl>,
    Arc<StubPoints>,
    Arc<RecordingPublisher>,
) {
    let control = Arc::new(StubControl::default());
    let points = Arc::new(StubPoints::default());
    let events = Arc::new(RecordingPublisher::default());
    let state = AppState::from_arcs(
        Arc::clone(&control),
        Arc::clone(&points),
        Arc::clone(&events),
    );
    (state, control, points, events)
}

pub(crate) async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
