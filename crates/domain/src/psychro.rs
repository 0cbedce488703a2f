//! Psychrometric calculator.
//!
//! Pure functions converting temperature (°C), relative humidity (%) and
//! pressure (hPa) into dew point, absolute humidity and specific humidity,
//! plus the wall-surface estimate used for the mold-risk classification.
//!
//! Functions return `None` for inputs outside their domain (humidity not in
//! `(0, 100]`, a zero thermal resistance, a non-finite result). Callers omit
//! the derived value in that case; absent and zero are distinct.

use serde::{Deserialize, Serialize};

use crate::error::CalculationError;

/// Inner surface heat transfer resistance of a wall in m²·K/W.
pub const INNER_SURFACE_RESISTANCE: f64 = 0.13;

/// Universal gas constant in J/(kmol·K).
const GAS_CONSTANT: f64 = 8314.3;
/// Molar mass of water vapour in kg/kmol.
const WATER_MOLAR_MASS: f64 = 18.016;
const KELVIN_OFFSET: f64 = 273.15;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn valid_humidity(humidity: f64) -> bool {
    humidity > 0.0 && humidity <= 100.0
}

/// Saturation vapour pressure over water (T ≥ 0) or ice, in hPa.
fn saturation_vapor_pressure(temperature: f64) -> f64 {
    let (a, b) = if temperature >= 0.0 {
        (7.5, 237.3)
    } else {
        (7.6, 240.7)
    };
    6.1078 * 10_f64.powf(a * temperature / (b + temperature))
}

/// Actual vapour pressure in hPa.
fn vapor_pressure(temperature: f64, humidity: f64) -> f64 {
    humidity / 100.0 * saturation_vapor_pressure(temperature)
}

/// Dew point in °C, rounded to whole degrees.
#[must_use]
pub fn dewpoint(temperature: f64, humidity: f64) -> Option<f64> {
    if !valid_humidity(humidity) || !temperature.is_finite() {
        return None;
    }
    let (a, b) = if temperature > 0.0 {
        (17.62, 243.12)
    } else {
        (22.46, 272.62)
    };
    let gamma = (humidity / 100.0).ln() + a * temperature / (b + temperature);
    finite(b * gamma / (a - gamma)).map(f64::round)
}

/// Absolute humidity in g/m³, rounded to one decimal.
#[must_use]
pub fn absolute_humidity(temperature: f64, humidity: f64) -> Option<f64> {
    if !valid_humidity(humidity) || !temperature.is_finite() {
        return None;
    }
    let vapor = vapor_pressure(temperature, humidity);
    let value = 1e5 * WATER_MOLAR_MASS / GAS_CONSTANT * vapor / (temperature + KELVIN_OFFSET);
    finite(value).map(|v| round_to(v, 1))
}

/// Specific humidity in g/kg at `pressure` hPa, rounded to two decimals.
#[must_use]
pub fn specific_humidity(temperature: f64, humidity: f64, pressure: f64) -> Option<f64> {
    if !valid_humidity(humidity) || !temperature.is_finite() || pressure <= 0.0 {
        return None;
    }
    let vapor = vapor_pressure(temperature, humidity);
    let value = 0.622 * vapor / (pressure - 0.378 * vapor) * 1000.0;
    finite(value).map(|v| round_to(v, 2))
}

/// Estimated inner wall-surface temperature in °C.
///
/// `None` when `thermal_resistance` is zero.
#[must_use]
pub fn wall_temperature(outside: f64, indoor: f64, thermal_resistance: f64) -> Option<f64> {
    if thermal_resistance == 0.0 {
        return None;
    }
    finite(indoor + (INNER_SURFACE_RESISTANCE / thermal_resistance) * (outside - indoor))
}

/// Three-level mold risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoldRisk {
    #[default]
    None,
    Warn,
    Alarm,
}

impl MoldRisk {
    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Warn => 1,
            Self::Alarm => 2,
        }
    }
}

impl std::fmt::Display for MoldRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Warn => "warn",
            Self::Alarm => "alarm",
        })
    }
}

/// Classify mold risk from the wall temperature and the indoor dew point.
///
/// A positive `min_humidity_threshold` suppresses the risk entirely while
/// the indoor humidity stays at or below it.
#[must_use]
pub fn mold_risk(
    wall_temperature: f64,
    indoor_dewpoint: f64,
    indoor_humidity: f64,
    min_humidity_threshold: f64,
) -> MoldRisk {
    if min_humidity_threshold > 0.0 && indoor_humidity <= min_humidity_threshold {
        return MoldRisk::None;
    }
    let margin = wall_temperature - indoor_dewpoint;
    if margin > 2.0 {
        MoldRisk::None
    } else if margin > 1.0 {
        MoldRisk::Warn
    } else {
        MoldRisk::Alarm
    }
}

/// Estimate a wall's thermal resistance from one simultaneous reading of
/// the outside, indoor and wall-surface temperatures.
///
/// # Errors
///
/// Returns [`CalculationError::NotCalculable`] when the wall temperature
/// equals the indoor temperature or the result is otherwise not finite.
pub fn thermal_resistance_from_calibration(
    outside: f64,
    indoor: f64,
    wall: f64,
) -> Result<f64, CalculationError> {
    let value = INNER_SURFACE_RESISTANCE * (outside - indoor) / (wall - indoor);
    finite(value)
        .map(|v| round_to(v, 3))
        .ok_or(CalculationError::NotCalculable("thermal resistance"))
}

/// Sensor readings feeding the derived humidity values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PsychroInputs {
    pub indoor_temperature: Option<f64>,
    pub indoor_humidity: Option<f64>,
    pub outdoor_temperature: Option<f64>,
    pub outdoor_humidity: Option<f64>,
    pub pressure: Option<f64>,
    /// Only set when the mold-risk estimate is enabled.
    pub thermal_resistance: Option<f64>,
    pub min_humidity_threshold: f64,
}

/// Derived values; each is absent when an input it needs is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PsychroReadings {
    pub indoor_dewpoint: Option<f64>,
    pub indoor_absolute_humidity: Option<f64>,
    pub indoor_specific_humidity: Option<f64>,
    pub outdoor_dewpoint: Option<f64>,
    pub outdoor_absolute_humidity: Option<f64>,
    pub wall_temperature: Option<f64>,
    pub mold_risk: Option<MoldRisk>,
}

impl PsychroInputs {
    #[must_use]
    pub fn derive(&self) -> PsychroReadings {
        let indoor = self.indoor_temperature.zip(self.indoor_humidity);
        let outdoor = self.outdoor_temperature.zip(self.outdoor_humidity);

        let indoor_dewpoint = indoor.and_then(|(t, h)| dewpoint(t, h));
        let wall = self
            .thermal_resistance
            .zip(self.outdoor_temperature)
            .zip(self.indoor_temperature)
            .and_then(|((r, out), inside)| wall_temperature(out, inside, r));
        let risk = wall
            .zip(indoor_dewpoint)
            .zip(self.indoor_humidity)
            .map(|((w, dp), h)| mold_risk(w, dp, h, self.min_humidity_threshold));

        PsychroReadings {
            indoor_dewpoint,
            indoor_absolute_humidity: indoor.and_then(|(t, h)| absolute_humidity(t, h)),
            indoor_specific_humidity: indoor
                .zip(self.pressure)
                .and_then(|((t, h), p)| specific_humidity(t, h, p)),
            outdoor_dewpoint: outdoor.and_then(|(t, h)| dewpoint(t, h)),
            outdoor_absolute_humidity: outdoor.and_then(|(t, h)| absolute_humidity(t, h)),
            wall_temperature: wall.map(|w| round_to(w, 1)),
            mold_risk: risk,
        }
    }
}
