//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`VentmonError`] via `#[from]` (domain errors) or a boxed source
//! (adapter errors).

/// Root error type crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum VentmonError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("calculation error")]
    Calculation(#[from] CalculationError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("script error")]
    Script(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A configuration or input that violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("point identifier must not be empty")]
    EmptyPointId,

    #[error("minimum one condition (open/tilt) must be defined")]
    NoConditions,

    #[error("{feature} requires the {sensor} point to be configured")]
    MissingSensor {
        feature: &'static str,
        sensor: &'static str,
    },

    #[error("thermal resistance must be greater than zero when mold risk is enabled")]
    ZeroThermalResistance,

    #[error("point {0} is published by the controller and cannot be written")]
    ReadOnlyPoint(String),
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A numeric result that cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    /// The inputs produce a division by zero, `NaN` or an infinity.
    #[error("{0} is not calculable with the given inputs")]
    NotCalculable(&'static str),
}
