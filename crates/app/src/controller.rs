//! Closure controller: the ventilation state machine.
//!
//! Both entry points ([`ClosureController::evaluate`] and
//! [`ClosureController::on_timer_fire`]) run under a per-instance lock
//! acquired with a bounded wait. When the wait runs out the call is
//! skipped: the evaluation holding the lock sees the same or newer inputs.
//!
//! Closure state and trigger time are kept in the controller's output
//! points; the episode step lives in the [`StepStore`]. Together they
//! survive restarts: the first evaluation re-arms the timer of a persisted
//! episode from its trigger time.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use ventmon_domain::closure::ClosureState;
use ventmon_domain::condition::Condition;
use ventmon_domain::config::{ControllerConfig, outputs};
use ventmon_domain::error::VentmonError;
use ventmon_domain::id::ControllerId;
use ventmon_domain::lowering::ValueSource;
use ventmon_domain::point::{PointId, PointValue, SavedValues};
use ventmon_domain::psychro::PsychroInputs;
use ventmon_domain::status::{ControllerSnapshot, ControllerStatus};
use ventmon_domain::step::Step;
use ventmon_domain::time;

use crate::duration::DurationSelector;
use crate::lowering::LoweringController;
use crate::notification::NotificationScheduler;
use crate::ports::{
    ClosureControl, ConditionEvaluator, Outcome, PointStore, ScriptRunner, StepStore, Timer,
};

/// One ventilation controller bound to its ports.
pub struct ClosureController<P, C, S, St, T> {
    id: ControllerId,
    config: ControllerConfig,
    status: ControllerStatus,
    watched: BTreeSet<PointId>,
    points: P,
    conditions: C,
    scripts: S,
    steps: St,
    timer: T,
    lock: Mutex<()>,
    resumed: AtomicBool,
}

impl<P, C, S, St, T> ClosureController<P, C, S, St, T>
where
    P: PointStore + Send + Sync,
    C: ConditionEvaluator + Send + Sync,
    S: ScriptRunner + Send + Sync,
    St: StepStore + Send + Sync,
    T: Timer + Send + Sync,
{
    /// Apply `config` and bind the controller to its ports.
    ///
    /// An invalid configuration is accepted but blocks every evaluation;
    /// see [`status`](Self::status).
    pub fn new(
        config: ControllerConfig,
        points: P,
        conditions: C,
        scripts: S,
        steps: St,
        timer: T,
    ) -> Self {
        let id = config.controller_id();
        let status = config.status();
        if let ControllerStatus::InvalidConfig(reason) = &status {
            tracing::warn!(controller = %id, name = %config.name, %reason, "controller configuration is invalid");
        }
        Self {
            id,
            watched: config.watched_points(),
            config,
            status,
            points,
            conditions,
            scripts,
            steps,
            timer,
            lock: Mutex::new(()),
            resumed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn id(&self) -> ControllerId {
        self.id
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn status(&self) -> &ControllerStatus {
        &self.status
    }

    /// Re-evaluate the closure state and drive the episode accordingly.
    ///
    /// # Errors
    ///
    /// Returns a storage error if output points or the step cannot be read
    /// or written. Actuation and script failures are logged, not returned.
    #[tracing::instrument(skip(self), fields(controller = %self.id))]
    pub async fn evaluate(&self) -> Result<Outcome, VentmonError> {
        if !self.status.is_active() {
            tracing::debug!(status = %self.status, "evaluation skipped");
            return Ok(Outcome::Inactive);
        }
        let Ok(_guard) = tokio::time::timeout(self.config.lock_wait(), self.lock.lock()).await
        else {
            tracing::info!("evaluation already in progress, skipped");
            return Ok(Outcome::Busy);
        };
        let closure_state = self.evaluate_locked().await?;
        Ok(Outcome::Evaluated { closure_state })
    }

    /// Continue the episode once the armed timer elapsed.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    #[tracing::instrument(skip(self), fields(controller = %self.id))]
    pub async fn on_timer_fire(&self) -> Result<Outcome, VentmonError> {
        if !self.status.is_active() {
            tracing::debug!(status = %self.status, "timer ignored");
            return Ok(Outcome::Inactive);
        }
        let Ok(_guard) = tokio::time::timeout(self.config.lock_wait(), self.lock.lock()).await
        else {
            tracing::info!("evaluation already in progress, timer skipped");
            return Ok(Outcome::Busy);
        };
        let closure_state = self.timer_fired_locked().await?;
        Ok(Outcome::Evaluated { closure_state })
    }

    /// Read the observable state without taking the lock.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the points or the step cannot be read.
    pub async fn snapshot(&self) -> Result<ControllerSnapshot, VentmonError> {
        Ok(ControllerSnapshot {
            id: self.id,
            name: self.config.name.clone(),
            status: self.status.clone(),
            closure_state: self.closure_state().await?,
            trigger_time: self.trigger_time().await?,
            step: self.load_step().await?,
        })
    }

    async fn evaluate_locked(&self) -> Result<ClosureState, VentmonError> {
        let new_state = self.observe_closure_state().await;
        let current = self.closure_state().await?;
        let trigger_time = self.trigger_time().await?;

        // Episode side effects go first: closure state and trigger time are
        // only committed once they succeeded, so a failed cycle is retried.
        if !self.monitoring_enabled().await {
            if trigger_time != 0 {
                tracing::info!(state = %new_state, "monitoring disabled, closing active episode");
                self.close_episode().await?;
                self.write_trigger_time(0).await?;
            }
            if new_state != current {
                self.write_closure_state(new_state).await?;
            }
        } else if new_state != current || (!new_state.is_closed() && trigger_time == 0) {
            tracing::info!(from = %current, to = %new_state, "closure state changed");
            if new_state.is_closed() {
                self.close_episode().await?;
                self.write_trigger_time(0).await?;
            } else {
                self.open_episode(new_state).await?;
                self.write_trigger_time(time::unix_seconds(time::now())).await?;
            }
            self.write_closure_state(new_state).await?;
        } else if new_state.is_closed() {
            if !self.load_step().await?.is_idle() {
                tracing::warn!("closed with an active episode step, restoring");
                self.close_episode().await?;
            }
        } else if !self.resumed.load(Ordering::Relaxed) {
            self.resume_timer(new_state, trigger_time).await?;
        }
        self.resumed.store(true, Ordering::Relaxed);

        self.publish_psychrometrics().await;
        Ok(new_state)
    }

    /// Re-arm the timer of an episode persisted before a restart.
    async fn resume_timer(
        &self,
        state: ClosureState,
        trigger_time: i64,
    ) -> Result<(), VentmonError> {
        let step = self.load_step().await?;
        let seconds = match &step {
            Step::Idle => 0,
            Step::Delay => remaining(trigger_time, self.delay_seconds().await),
            Step::Lowered { .. } => match self.duration_selector().select(state).await {
                0 => 0,
                duration => remaining(trigger_time, duration),
            },
            Step::Notified { .. } => self
                .notifications()
                .repeat_pause()
                .map_or(0, |pause| pause.as_secs()),
        };
        if !step.is_idle() {
            tracing::info!(step = step.name(), seconds, "episode resumed");
        }
        self.arm_timer_for(&step, seconds);
        Ok(())
    }

    async fn timer_fired_locked(&self) -> Result<ClosureState, VentmonError> {
        let state = self.closure_state().await?;
        if !self.timer.claim_expiry() {
            tracing::debug!("timer expiry superseded, ignored");
            return Ok(state);
        }
        if !self.monitoring_enabled().await {
            tracing::debug!("monitoring disabled, timer ignored");
            self.arm_timer_for(&Step::Idle, 0);
            return Ok(state);
        }
        if state.is_closed() {
            self.close_episode().await?;
            return Ok(state);
        }
        match self.load_step().await? {
            Step::Idle | Step::Delay => self.lower_and_track(state).await?,
            Step::Lowered { saved } => self.escalate(saved, 0).await?,
            Step::Notified { saved, repetitions } => self.escalate(saved, repetitions).await?,
        }
        Ok(state)
    }

    async fn open_episode(&self, state: ClosureState) -> Result<(), VentmonError> {
        let step = self.load_step().await?;
        if step.is_lowered() {
            // open <-> tilted: keep what was captured, only the duration changes
            let seconds = self.duration_selector().select(state).await;
            let step = Step::Lowered {
                saved: step.into_saved_values(),
            };
            self.persist(&step).await?;
            self.arm_timer_for(&step, seconds);
            tracing::info!(%state, seconds, "duration re-selected for lowered episode");
            return Ok(());
        }

        let delay = self.delay_seconds().await;
        if delay > 0 {
            let step = Step::Delay;
            self.persist(&step).await?;
            self.arm_timer_for(&step, delay);
            tracing::info!(%state, delay, "debounce delay started");
            Ok(())
        } else {
            self.lower_and_track(state).await
        }
    }

    async fn lower_and_track(&self, state: ClosureState) -> Result<(), VentmonError> {
        let saved = self.lowering().lower().await;
        let seconds = self.duration_selector().select(state).await;
        let step = Step::Lowered { saved };
        if let Err(err) = self.persist(&step).await {
            tracing::warn!(%err, "failed to persist lowered step, restoring targets");
            self.lowering().restore(step.into_saved_values()).await;
            return Err(err);
        }
        self.arm_timer_for(&step, seconds);
        tracing::info!(%state, seconds, "ventilation duration started");
        Ok(())
    }

    async fn close_episode(&self) -> Result<(), VentmonError> {
        let step = self.load_step().await?;
        if !step.is_idle() {
            let from = step.name();
            self.lowering().restore(step.into_saved_values()).await;
            self.persist(&Step::Idle).await?;
            tracing::info!(from, "episode closed");
        }
        self.arm_timer_for(&Step::Idle, 0);
        Ok(())
    }

    async fn escalate(&self, saved: SavedValues, repetitions: u32) -> Result<(), VentmonError> {
        let notifications = self.notifications();
        if !notifications.is_configured() {
            tracing::info!("ventilation duration elapsed, no notification configured");
            self.arm_timer_for(&Step::Lowered { saved }, 0);
            return Ok(());
        }
        notifications.notify(self.targets()).await;
        let pause = notifications.repeat_pause();
        let step = Step::Notified {
            saved,
            repetitions: if pause.is_some() {
                repetitions.saturating_add(1)
            } else {
                repetitions
            },
        };
        self.persist(&step).await?;
        self.arm_timer_for(&step, pause.map_or(0, |p| p.as_secs()));
        Ok(())
    }

    /// The single place where the timer is armed or disarmed.
    fn arm_timer_for(&self, step: &Step, seconds: u64) {
        if step.is_idle() || seconds == 0 {
            tracing::debug!(step = step.name(), "timer disarmed");
            self.timer.disarm();
        } else {
            tracing::debug!(step = step.name(), seconds, "timer armed");
            self.timer.arm(Duration::from_secs(seconds));
        }
    }

    fn duration_selector(&self) -> DurationSelector<'_, P, C> {
        DurationSelector::new(
            &self.config.durations,
            self.config.outside_temperature.as_ref(),
            &self.points,
            &self.conditions,
        )
    }

    fn lowering(&self) -> LoweringController<'_, P, S> {
        LoweringController::new(
            self.config.lowering.as_ref(),
            self.id,
            &self.points,
            &self.scripts,
        )
    }

    fn notifications(&self) -> NotificationScheduler<'_, S> {
        NotificationScheduler::new(self.config.notification.as_ref(), self.id, &self.scripts)
    }

    fn targets(&self) -> &[PointId] {
        self.config
            .lowering
            .as_ref()
            .map_or(&[], |lowering| lowering.targets.as_slice())
    }

    async fn observe_closure_state(&self) -> ClosureState {
        let open = self.passes("open", self.config.open_predicate()).await;
        let tilted = self.passes("tilt", self.config.tilt_predicate()).await;
        let state = ClosureState::from_predicates(open, tilted);
        tracing::debug!(open, tilted, %state, "conditions evaluated");
        state
    }

    async fn passes(&self, axis: &'static str, condition: Option<&Condition>) -> bool {
        let Some(condition) = condition else {
            return false;
        };
        match self.conditions.evaluate(condition).await {
            Ok(passed) => passed,
            Err(err) => {
                tracing::warn!(%err, axis, %condition, "condition failed to evaluate");
                false
            }
        }
    }

    async fn monitoring_enabled(&self) -> bool {
        let Some(point) = &self.config.monitoring_enable else {
            return true;
        };
        match self.points.read_point(point).await {
            Ok(value) => value.as_ref().and_then(PointValue::as_bool).unwrap_or(true),
            Err(err) => {
                tracing::warn!(%err, %point, "failed to read monitoring switch");
                true
            }
        }
    }

    async fn delay_seconds(&self) -> u64 {
        let delay = &self.config.delay;
        let value = match &delay.value {
            ValueSource::Fixed(value) => *value,
            ValueSource::Point(point) => match self.points.read_point(point).await {
                Ok(value) => value
                    .as_ref()
                    .and_then(PointValue::as_i64)
                    .and_then(|v| u64::try_from(v).ok())
                    .unwrap_or(0),
                Err(err) => {
                    tracing::warn!(%err, %point, "failed to read delay");
                    0
                }
            },
        };
        delay.unit.to_seconds(value)
    }

    async fn closure_state(&self) -> Result<ClosureState, VentmonError> {
        let point = self.config.output_point(outputs::CLOSURE_STATE);
        let value = self.points.read_point(&point).await?;
        Ok(value
            .as_ref()
            .and_then(PointValue::as_i64)
            .and_then(ClosureState::from_i64)
            .unwrap_or_default())
    }

    async fn write_closure_state(&self, state: ClosureState) -> Result<(), VentmonError> {
        let point = self.config.output_point(outputs::CLOSURE_STATE);
        self.points
            .write_point(&point, PointValue::Int(state.as_i64()))
            .await
    }

    async fn trigger_time(&self) -> Result<i64, VentmonError> {
        let point = self.config.output_point(outputs::TRIGGER_TIME);
        let value = self.points.read_point(&point).await?;
        Ok(value.as_ref().and_then(PointValue::as_i64).unwrap_or(0))
    }

    async fn write_trigger_time(&self, seconds: i64) -> Result<(), VentmonError> {
        let point = self.config.output_point(outputs::TRIGGER_TIME);
        self.points.write_point(&point, PointValue::Int(seconds)).await
    }

    async fn load_step(&self) -> Result<Step, VentmonError> {
        Ok(self.steps.load(self.id).await?.unwrap_or_default())
    }

    async fn persist(&self, step: &Step) -> Result<(), VentmonError> {
        self.steps.persist(self.id, step).await?;
        tracing::debug!(step = step.name(), "step persisted");
        Ok(())
    }

    async fn read_number(&self, point: Option<&PointId>) -> Option<f64> {
        let point = point?;
        match self.points.read_point(point).await {
            Ok(value) => value.as_ref().and_then(PointValue::as_f64),
            Err(err) => {
                tracing::warn!(%err, %point, "failed to read sensor");
                None
            }
        }
    }

    async fn publish_psychrometrics(&self) {
        let Some(humidity) = &self.config.humidity else {
            return;
        };
        let inputs = PsychroInputs {
            indoor_temperature: self.read_number(humidity.indoor_temperature.as_ref()).await,
            indoor_humidity: self.read_number(humidity.indoor_humidity.as_ref()).await,
            outdoor_temperature: self
                .read_number(self.config.outside_temperature.as_ref())
                .await,
            outdoor_humidity: self.read_number(humidity.outdoor_humidity.as_ref()).await,
            pressure: if humidity.specific_humidity {
                self.read_number(humidity.pressure.as_ref()).await
            } else {
                None
            },
            thermal_resistance: humidity.mold_risk.map(|m| m.thermal_resistance),
            min_humidity_threshold: humidity
                .mold_risk
                .map_or(0.0, |m| m.min_humidity_threshold),
        };
        let readings = inputs.derive();
        let values = [
            (outputs::INDOOR_DEWPOINT, readings.indoor_dewpoint),
            (
                outputs::INDOOR_ABSOLUTE_HUMIDITY,
                readings.indoor_absolute_humidity,
            ),
            (
                outputs::INDOOR_SPECIFIC_HUMIDITY,
                readings.indoor_specific_humidity,
            ),
            (outputs::OUTDOOR_DEWPOINT, readings.outdoor_dewpoint),
            (
                outputs::OUTDOOR_ABSOLUTE_HUMIDITY,
                readings.outdoor_absolute_humidity,
            ),
            (outputs::WALL_TEMPERATURE, readings.wall_temperature),
        ];
        for (suffix, value) in values
            .into_iter()
            .filter_map(|(suffix, value)| value.map(|v| (suffix, v)))
        {
            self.publish_output(suffix, PointValue::Float(value)).await;
        }
        if let Some(risk) = readings.mold_risk {
            self.publish_output(outputs::MOLD_RISK, PointValue::Int(risk.as_i64()))
                .await;
        }
    }

    async fn publish_output(&self, suffix: &str, value: PointValue) {
        let point = self.config.output_point(suffix);
        if let Err(err) = self.points.write_point(&point, value).await {
            tracing::warn!(%err, %point, "failed to publish derived value");
        }
    }
}

/// Seconds left of `total` counted from `since`; an overdue deadline fires
/// after one second.
fn remaining(since: i64, total: u64) -> u64 {
    let elapsed = time::unix_seconds(time::now()).saturating_sub(since);
    let elapsed = u64::try_from(elapsed).unwrap_or(0);
    total.saturating_sub(elapsed).max(1)
}

impl<P, C, S, St, T> ClosureControl for ClosureController<P, C, S, St, T>
where
    P: PointStore + Send + Sync,
    C: ConditionEvaluator + Send + Sync,
    S: ScriptRunner + Send + Sync,
    St: StepStore + Send + Sync,
    T: Timer + Send + Sync,
{
    async fn evaluate(&self) -> Result<Outcome, VentmonError> {
        ClosureController::evaluate(self).await
    }

    async fn on_timer_fire(&self) -> Result<Outcome, VentmonError> {
        ClosureController::on_timer_fire(self).await
    }

    async fn snapshot(&self) -> Result<ControllerSnapshot, VentmonError> {
        ClosureController::snapshot(self).await
    }

    fn watches(&self, point: &PointId) -> bool {
        self.watched.contains(point)
    }

    fn owns(&self, point: &PointId) -> bool {
        self.config.is_output_point(point)
    }
}
