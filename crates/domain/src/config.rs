//! Controller configuration: everything one ventilation controller needs.
//!
//! A configuration is applied as a whole. [`ControllerConfig::status`]
//! decides whether the controller may evaluate at all; an invalid
//! configuration blocks every evaluation until it is fixed.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, configured};
use crate::duration::DurationPolicy;
use crate::error::{ValidationError, VentmonError};
use crate::id::ControllerId;
use crate::lowering::{LoweringConfig, ValueSource};
use crate::notification::NotificationConfig;
use crate::point::PointId;
use crate::status::ControllerStatus;
use crate::time_unit::TimeUnit;

/// Suffixes of the points a controller publishes under its own name.
pub mod outputs {
    pub const CLOSURE_STATE: &str = "closure_state";
    pub const TRIGGER_TIME: &str = "trigger_time";
    pub const INDOOR_DEWPOINT: &str = "indoor_dewpoint";
    pub const INDOOR_ABSOLUTE_HUMIDITY: &str = "indoor_absolute_humidity";
    pub const INDOOR_SPECIFIC_HUMIDITY: &str = "indoor_specific_humidity";
    pub const OUTDOOR_DEWPOINT: &str = "outdoor_dewpoint";
    pub const OUTDOOR_ABSOLUTE_HUMIDITY: &str = "outdoor_absolute_humidity";
    pub const WALL_TEMPERATURE: &str = "wall_temperature";
    pub const MOLD_RISK: &str = "mold_risk";

    pub const ALL: [&str; 9] = [
        CLOSURE_STATE,
        TRIGGER_TIME,
        INDOOR_DEWPOINT,
        INDOOR_ABSOLUTE_HUMIDITY,
        INDOOR_SPECIFIC_HUMIDITY,
        OUTDOOR_DEWPOINT,
        OUTDOOR_ABSOLUTE_HUMIDITY,
        WALL_TEMPERATURE,
        MOLD_RISK,
    ];
}

const DEFAULT_LOCK_WAIT_SECS: u64 = 5;

/// Debounce delay applied before lowering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub value: ValueSource<u64>,
    pub unit: TimeUnit,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            value: ValueSource::Fixed(0),
            unit: TimeUnit::Seconds,
        }
    }
}

/// Mold-risk estimate settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoldRiskConfig {
    /// Wall thermal resistance in m²·K/W, see the calibration helper.
    pub thermal_resistance: f64,
    /// Indoor humidity (%) at or below which no risk is reported; 0 disables.
    #[serde(default)]
    pub min_humidity_threshold: f64,
}

/// Humidity derivation inputs. Present means enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityConfig {
    pub indoor_temperature: Option<PointId>,
    pub indoor_humidity: Option<PointId>,
    pub outdoor_humidity: Option<PointId>,
    pub pressure: Option<PointId>,
    pub specific_humidity: bool,
    pub mold_risk: Option<MoldRiskConfig>,
}

/// Full configuration of one ventilation controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Explicit id; derived from `name` when absent.
    pub id: Option<ControllerId>,
    pub name: String,
    pub disabled: bool,
    pub open_conditions: Option<Condition>,
    pub tilt_conditions: Option<Condition>,
    pub delay: DelayConfig,
    pub outside_temperature: Option<PointId>,
    /// Boolean point; when it reads false the control loop is frozen.
    pub monitoring_enable: Option<PointId>,
    pub durations: DurationPolicy,
    pub lowering: Option<LoweringConfig>,
    pub notification: Option<NotificationConfig>,
    pub humidity: Option<HumidityConfig>,
    pub lock_wait_secs: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: "ventilation".to_string(),
            disabled: false,
            open_conditions: None,
            tilt_conditions: None,
            delay: DelayConfig::default(),
            outside_temperature: None,
            monitoring_enable: None,
            durations: DurationPolicy::default(),
            lowering: None,
            notification: None,
            humidity: None,
            lock_wait_secs: DEFAULT_LOCK_WAIT_SECS,
        }
    }
}

impl ControllerConfig {
    /// Create a builder for constructing a [`ControllerConfig`].
    #[must_use]
    pub fn builder() -> ControllerConfigBuilder {
        ControllerConfigBuilder::default()
    }

    #[must_use]
    pub fn controller_id(&self) -> ControllerId {
        self.id
            .unwrap_or_else(|| ControllerId::from_name(self.name.trim()))
    }

    #[must_use]
    pub fn lock_wait(&self) -> Duration {
        Duration::from_secs(self.lock_wait_secs)
    }

    #[must_use]
    pub fn open_predicate(&self) -> Option<&Condition> {
        configured(self.open_conditions.as_ref())
    }

    #[must_use]
    pub fn tilt_predicate(&self) -> Option<&Condition> {
        configured(self.tilt_conditions.as_ref())
    }

    /// Point published by this controller under its own name.
    #[must_use]
    pub fn output_point(&self, suffix: &str) -> PointId {
        PointId::new(format!("{}.{suffix}", self.name.trim()))
    }

    /// Whether `point` is one of the points this controller publishes.
    #[must_use]
    pub fn is_output_point(&self, point: &PointId) -> bool {
        point
            .as_str()
            .strip_prefix(self.name.trim())
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|suffix| outputs::ALL.contains(&suffix))
    }

    /// Check configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - neither open nor tilt conditions carry a predicate
    ///   ([`ValidationError::NoConditions`])
    /// - an enabled humidity feature lacks one of its input points
    ///   ([`ValidationError::MissingSensor`])
    /// - mold risk is enabled with a non-positive thermal resistance
    ///   ([`ValidationError::ZeroThermalResistance`])
    /// - a lowering target is blank ([`ValidationError::EmptyPointId`])
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.open_predicate().is_none() && self.tilt_predicate().is_none() {
            return Err(ValidationError::NoConditions);
        }
        if let Some(humidity) = &self.humidity {
            if humidity.indoor_temperature.is_none() {
                return Err(ValidationError::MissingSensor {
                    feature: "humidity calculation",
                    sensor: "indoor temperature",
                });
            }
            if humidity.indoor_humidity.is_none() {
                return Err(ValidationError::MissingSensor {
                    feature: "humidity calculation",
                    sensor: "indoor humidity",
                });
            }
            if humidity.specific_humidity && humidity.pressure.is_none() {
                return Err(ValidationError::MissingSensor {
                    feature: "specific humidity",
                    sensor: "air pressure",
                });
            }
            if let Some(mold) = &humidity.mold_risk {
                if self.outside_temperature.is_none() {
                    return Err(ValidationError::MissingSensor {
                        feature: "mold risk",
                        sensor: "outside temperature",
                    });
                }
                if mold.thermal_resistance <= 0.0 {
                    return Err(ValidationError::ZeroThermalResistance);
                }
            }
        }
        if let Some(lowering) = &self.lowering
            && lowering.targets.iter().any(PointId::is_empty)
        {
            return Err(ValidationError::EmptyPointId);
        }
        Ok(())
    }

    /// Whether the controller may evaluate with this configuration.
    #[must_use]
    pub fn status(&self) -> ControllerStatus {
        if self.disabled {
            return ControllerStatus::Inactive;
        }
        match self.validate() {
            Ok(()) => ControllerStatus::Active,
            Err(err) => ControllerStatus::InvalidConfig(err.to_string()),
        }
    }

    /// Points whose changes must trigger an evaluation.
    #[must_use]
    pub fn watched_points(&self) -> BTreeSet<PointId> {
        let mut points = BTreeSet::new();
        if let Some(condition) = self.open_predicate() {
            condition.collect_points(&mut points);
        }
        if let Some(condition) = self.tilt_predicate() {
            condition.collect_points(&mut points);
        }
        points.extend(self.outside_temperature.iter().cloned());
        points.extend(self.monitoring_enable.iter().cloned());
        if let Some(humidity) = &self.humidity {
            points.extend(
                [
                    &humidity.indoor_temperature,
                    &humidity.indoor_humidity,
                    &humidity.outdoor_humidity,
                    &humidity.pressure,
                ]
                .into_iter()
                .flatten()
                .cloned(),
            );
        }
        points
    }
}

/// Step-by-step builder for [`ControllerConfig`].
#[derive(Debug, Default)]
pub struct ControllerConfigBuilder {
    config: ControllerConfig,
}

impl ControllerConfigBuilder {
    #[must_use]
    pub fn id(mut self, id: ControllerId) -> Self {
        self.config.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use]
    pub fn open_conditions(mut self, condition: Condition) -> Self {
        self.config.open_conditions = Some(condition);
        self
    }

    #[must_use]
    pub fn tilt_conditions(mut self, condition: Condition) -> Self {
        self.config.tilt_conditions = Some(condition);
        self
    }

    #[must_use]
    pub fn delay(mut self, value: ValueSource<u64>, unit: TimeUnit) -> Self {
        self.config.delay = DelayConfig { value, unit };
        self
    }

    #[must_use]
    pub fn outside_temperature(mut self, point: impl Into<PointId>) -> Self {
        self.config.outside_temperature = Some(point.into());
        self
    }

    #[must_use]
    pub fn monitoring_enable(mut self, point: impl Into<PointId>) -> Self {
        self.config.monitoring_enable = Some(point.into());
        self
    }

    #[must_use]
    pub fn durations(mut self, durations: DurationPolicy) -> Self {
        self.config.durations = durations;
        self
    }

    #[must_use]
    pub fn lowering(mut self, lowering: LoweringConfig) -> Self {
        self.config.lowering = Some(lowering);
        self
    }

    #[must_use]
    pub fn notification(mut self, notification: NotificationConfig) -> Self {
        self.config.notification = Some(notification);
        self
    }

    #[must_use]
    pub fn humidity(mut self, humidity: HumidityConfig) -> Self {
        self.config.humidity = Some(humidity);
        self
    }

    #[must_use]
    pub fn lock_wait_secs(mut self, secs: u64) -> Self {
        self.config.lock_wait_secs = secs;
        self
    }

    /// Consume the builder, validating the result.
    ///
    /// # Errors
    ///
    /// Returns [`VentmonError::Validation`] if the configuration fails
    /// [`ControllerConfig::validate`].
    pub fn build(self) -> Result<ControllerConfig, VentmonError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
