//! Lowering policy: what happens to target actuators during ventilation.
//!
//! While an episode is active, every target point is commanded to a
//! reduced setpoint (or a window-open trigger value, or whatever an
//! external script decides). The values captured beforehand are written
//! back when the episode closes.

use serde::{Deserialize, Serialize};

use crate::point::PointId;

/// A value given either inline or by reading another point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource<T> {
    Fixed(T),
    Point(PointId),
}

/// Reference to an external script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRef {
    /// Program to run.
    pub program: String,
    /// Extra arguments passed before the JSON parameters are streamed in.
    #[serde(default)]
    pub args: Vec<String>,
}

impl ScriptRef {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

impl std::fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How targets are driven while lowered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LoweringMode {
    /// Write a temperature setpoint to every target.
    Temperature { value: ValueSource<f64> },
    /// Write an integer trigger (e.g. a "window open" state) to every target.
    Trigger { value: ValueSource<i64> },
    /// Delegate lowering and restoring to a script that owns the save-map.
    Script { script: ScriptRef },
}

/// Targets plus the mode used to lower them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoweringConfig {
    pub targets: Vec<PointId>,
    #[serde(flatten)]
    pub mode: LoweringMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_deserialize_temperature_mode_with_fixed_value() {
        let json = serde_json::json!({
            "targets": ["room.setpoint"],
            "mode": "temperature",
            "value": {"fixed": 12.0}
        });
        let config: LoweringConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.targets, vec![PointId::new("room.setpoint")]);
        assert_eq!(
            config.mode,
            LoweringMode::Temperature {
                value: ValueSource::Fixed(12.0)
            }
        );
    }

    #[test]
    fn should_deserialize_trigger_mode_with_point_value() {
        let json = serde_json::json!({
            "targets": ["room.window_state"],
            "mode": "trigger",
            "value": {"point": "global.window_open_code"}
        });
        let config: LoweringConfig = serde_json::from_value(json).unwrap();
        assert!(matches!(
            config.mode,
            LoweringMode::Trigger { value: ValueSource::Point(ref p) } if p.as_str() == "global.window_open_code"
        ));
    }

    #[test]
    fn should_deserialize_script_mode_without_args() {
        let json = serde_json::json!({
            "targets": [],
            "mode": "script",
            "script": {"program": "/usr/local/bin/lower.sh"}
        });
        let config: LoweringConfig = serde_json::from_value(json).unwrap();
        assert!(
            matches!(config.mode, LoweringMode::Script { ref script } if script.args.is_empty())
        );
    }

    #[test]
    fn should_display_script_with_args() {
        let script = ScriptRef {
            program: "notify".to_string(),
            args: vec!["--room".to_string(), "kitchen".to_string()],
        };
        assert_eq!(script.to_string(), "notify --room kitchen");
    }
}
