//! Lowering: drive target actuators down while ventilating, and back up
//! afterwards.
//!
//! Every mode goes through the same [`LoweringStrategy`] interface. All
//! writes are commanded actuations. Failures are logged and skipped; the
//! episode carries on with whatever could be captured.

use std::future::Future;

use ventmon_domain::id::ControllerId;
use ventmon_domain::lowering::{LoweringConfig, LoweringMode, ScriptRef, ValueSource};
use ventmon_domain::point::{PointId, PointValue, SavedValues};

use crate::ports::{PointStore, ScriptRunner};

/// Lower a set of targets and restore them later.
pub trait LoweringStrategy {
    /// Lower `targets`, returning the values to restore afterwards.
    fn lower(&self, targets: &[PointId]) -> impl Future<Output = SavedValues> + Send;

    /// Write `saved` back.
    fn restore(&self, saved: SavedValues) -> impl Future<Output = ()> + Send;
}

async fn capture<P: PointStore + Sync>(points: &P, targets: &[PointId]) -> SavedValues {
    let mut saved = SavedValues::new();
    for target in targets {
        match points.read_point(target).await {
            Ok(Some(value)) => {
                saved.insert(target.clone(), value);
            }
            Ok(None) => tracing::debug!(%target, "target has no value to capture"),
            Err(err) => tracing::warn!(%err, %target, "failed to capture target value"),
        }
    }
    saved
}

async fn actuate<P: PointStore + Sync>(points: &P, target: &PointId, value: PointValue) {
    if let Err(err) = points.request_actuation(target, value).await {
        tracing::warn!(%err, %target, "actuation request failed");
    }
}

async fn restore_values<P: PointStore + Sync>(points: &P, saved: SavedValues) {
    for (target, value) in saved {
        actuate(points, &target, value).await;
    }
}

async fn resolve<P, T>(
    points: &P,
    source: &ValueSource<T>,
    convert: fn(&PointValue) -> Option<T>,
) -> Option<T>
where
    P: PointStore + Sync,
    T: Clone,
{
    match source {
        ValueSource::Fixed(value) => Some(value.clone()),
        ValueSource::Point(point) => match points.read_point(point).await {
            Ok(value) => value.as_ref().and_then(convert),
            Err(err) => {
                tracing::warn!(%err, %point, "failed to read lowering value");
                None
            }
        },
    }
}

/// Writes a fixed or point-sourced temperature setpoint to every target.
pub struct SetpointLowering<'a, P> {
    points: &'a P,
    value: &'a ValueSource<f64>,
}

impl<'a, P: PointStore + Sync> SetpointLowering<'a, P> {
    pub fn new(points: &'a P, value: &'a ValueSource<f64>) -> Self {
        Self { points, value }
    }
}

impl<P: PointStore + Sync> LoweringStrategy for SetpointLowering<'_, P> {
    async fn lower(&self, targets: &[PointId]) -> SavedValues {
        let saved = capture(self.points, targets).await;
        let Some(setpoint) = resolve(self.points, self.value, PointValue::as_f64).await else {
            tracing::warn!("lowering setpoint unavailable, targets left unchanged");
            return saved;
        };
        for target in targets {
            actuate(self.points, target, PointValue::Float(setpoint)).await;
        }
        saved
    }

    async fn restore(&self, saved: SavedValues) {
        restore_values(self.points, saved).await;
    }
}

/// Writes a fixed or point-sourced integer trigger to every target.
pub struct TriggerLowering<'a, P> {
    points: &'a P,
    value: &'a ValueSource<i64>,
}

impl<'a, P: PointStore + Sync> TriggerLowering<'a, P> {
    pub fn new(points: &'a P, value: &'a ValueSource<i64>) -> Self {
        Self { points, value }
    }
}

impl<P: PointStore + Sync> LoweringStrategy for TriggerLowering<'_, P> {
    async fn lower(&self, targets: &[PointId]) -> SavedValues {
        let saved = capture(self.points, targets).await;
        let Some(trigger) = resolve(self.points, self.value, PointValue::as_i64).await else {
            tracing::warn!("lowering trigger unavailable, targets left unchanged");
            return saved;
        };
        for target in targets {
            actuate(self.points, target, PointValue::Int(trigger)).await;
        }
        saved
    }

    async fn restore(&self, saved: SavedValues) {
        restore_values(self.points, saved).await;
    }
}

/// Hands lowering and restoring to an external script.
///
/// The script receives `{lower, save, controller_id}` and may answer with
/// `{"save": {...}}` to replace the save-map.
pub struct ScriptLowering<'a, P, S> {
    points: &'a P,
    scripts: &'a S,
    script: &'a ScriptRef,
    controller: ControllerId,
}

impl<'a, P, S> ScriptLowering<'a, P, S>
where
    P: PointStore + Sync,
    S: ScriptRunner + Sync,
{
    pub fn new(points: &'a P, scripts: &'a S, script: &'a ScriptRef, controller: ControllerId) -> Self {
        Self {
            points,
            scripts,
            script,
            controller,
        }
    }

    fn params(&self, lower: bool, saved: &SavedValues) -> serde_json::Value {
        serde_json::json!({
            "lower": lower,
            "save": saved,
            "controller_id": self.controller,
        })
    }
}

impl<P, S> LoweringStrategy for ScriptLowering<'_, P, S>
where
    P: PointStore + Sync,
    S: ScriptRunner + Sync,
{
    async fn lower(&self, targets: &[PointId]) -> SavedValues {
        let captured = capture(self.points, targets).await;
        let params = self.params(true, &captured);
        match self.scripts.invoke(self.script, params).await {
            Ok(response) => adopt_save_map(response, captured),
            Err(err) => {
                tracing::warn!(%err, script = %self.script, "lowering script failed, keeping captured values");
                captured
            }
        }
    }

    async fn restore(&self, saved: SavedValues) {
        let params = self.params(false, &saved);
        if let Err(err) = self.scripts.invoke(self.script, params).await {
            tracing::warn!(%err, script = %self.script, "restoring script failed");
        }
    }
}

fn adopt_save_map(response: serde_json::Value, captured: SavedValues) -> SavedValues {
    let Some(save) = response.get("save") else {
        return captured;
    };
    match serde_json::from_value::<SavedValues>(save.clone()) {
        Ok(saved) => saved,
        Err(err) => {
            tracing::warn!(%err, "malformed save-map returned by lowering script, keeping captured values");
            captured
        }
    }
}

/// Applies the configured lowering mode to the configured targets.
///
/// Without a lowering configuration both operations do nothing.
pub struct LoweringController<'a, P, S> {
    config: Option<&'a LoweringConfig>,
    controller: ControllerId,
    points: &'a P,
    scripts: &'a S,
}

impl<'a, P, S> LoweringController<'a, P, S>
where
    P: PointStore + Sync,
    S: ScriptRunner + Sync,
{
    pub fn new(
        config: Option<&'a LoweringConfig>,
        controller: ControllerId,
        points: &'a P,
        scripts: &'a S,
    ) -> Self {
        Self {
            config,
            controller,
            points,
            scripts,
        }
    }

    pub async fn lower(&self) -> SavedValues {
        let Some(config) = self.config else {
            return SavedValues::new();
        };
        let saved = match &config.mode {
            LoweringMode::Temperature { value } => {
                SetpointLowering::new(self.points, value)
                    .lower(&config.targets)
                    .await
            }
            LoweringMode::Trigger { value } => {
                TriggerLowering::new(self.points, value)
                    .lower(&config.targets)
                    .await
            }
            LoweringMode::Script { script } => {
                ScriptLowering::new(self.points, self.scripts, script, self.controller)
                    .lower(&config.targets)
                    .await
            }
        };
        tracing::info!(controller = %self.controller, targets = config.targets.len(), saved = saved.len(), "targets lowered");
        saved
    }

    pub async fn restore(&self, saved: SavedValues) {
        let Some(config) = self.config else {
            return;
        };
        let count = saved.len();
        match &config.mode {
            LoweringMode::Temperature { value } => {
                SetpointLowering::new(self.points, value).restore(saved).await;
            }
            LoweringMode::Trigger { value } => {
                TriggerLowering::new(self.points, value).restore(saved).await;
            }
            LoweringMode::Script { script } => {
                ScriptLowering::new(self.points, self.scripts, script, self.controller)
                    .restore(saved)
                    .await;
            }
        }
        tracing::info!(controller = %self.controller, restored = count, "targets restored");
    }
}
