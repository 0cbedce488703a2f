//! Points: addressable sensor and actuator values.
//!
//! A point is anything the controller can read (window contact, outdoor
//! temperature, humidity) or command (thermostat setpoint, window-state
//! trigger). Points are addressed by a free-form [`PointId`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a sensor or actuator point, e.g. `living_room.setpoint`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(String);

impl PointId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PointId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PointId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single typed point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl PointValue {
    /// Numeric view of the value. Booleans map to `0.0` / `1.0`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().parse().ok(),
        }
    }

    /// Integer view of the value. Floats are truncated toward zero.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            #[allow(clippy::cast_possible_truncation)]
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Float(_) => None,
            Self::String(s) => s.trim().parse().ok(),
        }
    }

    /// Boolean view of the value. Numbers are `true` when non-zero.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(i) => Some(*i != 0),
            Self::Float(f) => Some(*f != 0.0),
            Self::String(s) => match s.trim() {
                "true" | "on" | "1" => Some(true),
                "false" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }
}

impl fmt::Display for PointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Actuator values captured before lowering, keyed by point.
pub type SavedValues = BTreeMap<PointId, PointValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_point_id_as_plain_string() {
        let id = PointId::new("room.setpoint");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"room.setpoint\"");
    }

    #[test]
    fn should_report_blank_point_id_as_empty() {
        assert!(PointId::new("  ").is_empty());
        assert!(!PointId::new("a").is_empty());
    }

    #[test]
    fn should_deserialize_integer_before_float() {
        let v: PointValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, PointValue::Int(42));
        let v: PointValue = serde_json::from_str("21.5").unwrap();
        assert_eq!(v, PointValue::Float(21.5));
    }

    #[test]
    fn should_convert_int_to_f64() {
        assert_eq!(PointValue::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn should_truncate_float_when_reading_as_i64() {
        assert_eq!(PointValue::Float(4.9).as_i64(), Some(4));
        assert_eq!(PointValue::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn should_read_numbers_as_bool_when_non_zero() {
        assert_eq!(PointValue::Int(0).as_bool(), Some(false));
        assert_eq!(PointValue::Float(1.0).as_bool(), Some(true));
        assert_eq!(PointValue::String("on".to_string()).as_bool(), Some(true));
        assert_eq!(PointValue::String("maybe".to_string()).as_bool(), None);
    }

    #[test]
    fn should_keep_saved_values_ordered_by_point() {
        let mut saved = SavedValues::new();
        saved.insert(PointId::new("b"), PointValue::Int(2));
        saved.insert(PointId::new("a"), PointValue::Int(1));
        let keys: Vec<_> = saved.keys().map(PointId::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
