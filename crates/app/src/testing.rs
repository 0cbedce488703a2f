//! In-memory and spy port implementations shared by the unit tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use ventmon_domain::error::VentmonError;
use ventmon_domain::id::ControllerId;
use ventmon_domain::lowering::ScriptRef;
use ventmon_domain::point::{PointId, PointValue};
use ventmon_domain::step::Step;

use crate::ports::{PointStore, ScriptRunner, StepStore, Timer};

// ── In-memory point store ──────────────────────────────────────

#[derive(Default)]
pub struct MemoryPoints {
    values: Mutex<BTreeMap<PointId, PointValue>>,
    actuations: Mutex<Vec<(PointId, PointValue)>>,
    fail_actuation: Mutex<bool>,
}

impl MemoryPoints {
    pub fn with(values: &[(&str, PointValue)]) -> Self {
        let points = Self::default();
        for (id, value) in values {
            points.set(id, value.clone());
        }
        points
    }

    pub fn set(&self, id: &str, value: PointValue) {
        self.values.lock().unwrap().insert(PointId::new(id), value);
    }

    pub fn remove(&self, id: &str) {
        self.values.lock().unwrap().remove(&PointId::new(id));
    }

    pub fn get(&self, id: &str) -> Option<PointValue> {
        self.values.lock().unwrap().get(&PointId::new(id)).cloned()
    }

    pub fn actuations(&self) -> Vec<(PointId, PointValue)> {
        self.actuations.lock().unwrap().clone()
    }

    pub fn fail_actuations(&self) {
        *self.fail_actuation.lock().unwrap() = true;
    }
}

impl PointStore for MemoryPoints {
    fn read_point(
        &self,
        id: &PointId,
    ) -> impl Future<Output = Result<Option<PointValue>, VentmonError>> + Send {
        let r = self.values.lock().unwrap().get(id).cloned();
        async { Ok(r) }
    }

    fn write_point(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        self.values.lock().unwrap().insert(id.clone(), value);
        async { Ok(()) }
    }

    fn request_actuation(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        let failing = *self.fail_actuation.lock().unwrap();
        if !failing {
            self.actuations
                .lock()
                .unwrap()
                .push((id.clone(), value.clone()));
            self.values.lock().unwrap().insert(id.clone(), value);
        }
        async move {
            if failing {
                Err(VentmonError::Storage("actuator offline".into()))
            } else {
                Ok(())
            }
        }
    }
}

// ── Spy script runner ──────────────────────────────────────────

pub struct SpyScripts {
    calls: Mutex<Vec<(ScriptRef, serde_json::Value)>>,
    response: Mutex<Option<serde_json::Value>>,
}

impl Default for SpyScripts {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: Mutex::new(Some(serde_json::Value::Null)),
        }
    }
}

impl SpyScripts {
    /// Answer every call with `value`.
    pub fn answering(value: serde_json::Value) -> Self {
        let spy = Self::default();
        *spy.response.lock().unwrap() = Some(value);
        spy
    }

    /// Fail every call.
    pub fn failing() -> Self {
        let spy = Self::default();
        *spy.response.lock().unwrap() = None;
        spy
    }

    pub fn calls(&self) -> Vec<(ScriptRef, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }
}

impl ScriptRunner for SpyScripts {
    fn invoke(
        &self,
        script: &ScriptRef,
        params: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, VentmonError>> + Send {
        self.calls.lock().unwrap().push((script.clone(), params));
        let response = self.response.lock().unwrap().clone();
        async move { response.ok_or_else(|| VentmonError::Script("exit status 1".into())) }
    }
}

// ── In-memory step store ───────────────────────────────────────

#[derive(Default)]
pub struct MemorySteps {
    steps: Mutex<HashMap<ControllerId, Step>>,
    fail_loads: Mutex<bool>,
    fail_persists: Mutex<bool>,
}

impl MemorySteps {
    pub fn get(&self, id: ControllerId) -> Step {
        self.steps
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn put(&self, id: ControllerId, step: Step) {
        self.steps.lock().unwrap().insert(id, step);
    }

    pub fn fail_loads(&self, failing: bool) {
        *self.fail_loads.lock().unwrap() = failing;
    }

    pub fn fail_persists(&self, failing: bool) {
        *self.fail_persists.lock().unwrap() = failing;
    }
}

impl StepStore for MemorySteps {
    fn load(
        &self,
        controller: ControllerId,
    ) -> impl Future<Output = Result<Option<Step>, VentmonError>> + Send {
        let r = if *self.fail_loads.lock().unwrap() {
            Err(VentmonError::Storage("database is locked".into()))
        } else {
            Ok(self.steps.lock().unwrap().get(&controller).cloned())
        };
        async { r }
    }

    fn persist(
        &self,
        controller: ControllerId,
        step: &Step,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        let r = if *self.fail_persists.lock().unwrap() {
            Err(VentmonError::Storage("database is locked".into()))
        } else {
            self.steps.lock().unwrap().insert(controller, step.clone());
            Ok(())
        };
        async { r }
    }
}

// ── Spy timer ──────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyTimer {
    armed: Mutex<Option<Duration>>,
    arms: Mutex<Vec<Duration>>,
    superseded: Mutex<bool>,
}

impl SpyTimer {
    /// Currently armed duration, `None` when disarmed.
    pub fn armed(&self) -> Option<Duration> {
        *self.armed.lock().unwrap()
    }

    pub fn arm_count(&self) -> usize {
        self.arms.lock().unwrap().len()
    }

    /// Make the next expiry unclaimable, as if re-armed after it fired.
    pub fn supersede(&self) {
        *self.superseded.lock().unwrap() = true;
    }
}

impl Timer for SpyTimer {
    fn arm(&self, after: Duration) {
        *self.armed.lock().unwrap() = Some(after);
        self.arms.lock().unwrap().push(after);
    }

    fn disarm(&self) {
        *self.armed.lock().unwrap() = None;
    }

    fn claim_expiry(&self) -> bool {
        !std::mem::take(&mut *self.superseded.lock().unwrap())
    }
}
