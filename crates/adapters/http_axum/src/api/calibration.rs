//! Thermal-resistance calibration helper.

use axum::Json;
use serde::{Deserialize, Serialize};

use ventmon_domain::error::VentmonError;
use ventmon_domain::psychro;

use crate::error::ApiError;

/// Three temperatures measured at the same moment, in °C.
#[derive(Debug, Deserialize)]
pub struct CalibrationRequest {
    pub outside_temperature: f64,
    pub indoor_temperature: f64,
    pub wall_temperature: f64,
}

#[derive(Debug, Serialize)]
pub struct CalibrationResponse {
    /// Estimated thermal resistance in m²·K/W.
    pub thermal_resistance: f64,
}

/// `POST /api/calibration`
pub async fn thermal_resistance(
    Json(req): Json<CalibrationRequest>,
) -> Result<Json<CalibrationResponse>, ApiError> {
    let thermal_resistance = psychro::thermal_resistance_from_calibration(
        req.outside_temperature,
        req.indoor_temperature,
        req.wall_temperature,
    )
    .map_err(VentmonError::from)?;
    Ok(Json(CalibrationResponse { thermal_resistance }))
}
