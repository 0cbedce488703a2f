//! Notification: escalation once ventilation outstays its duration.

use std::time::Duration;

use ventmon_domain::id::ControllerId;
use ventmon_domain::notification::NotificationConfig;
use ventmon_domain::point::PointId;

use crate::ports::ScriptRunner;

/// Fires the configured notification script.
///
/// Fire-and-forget: the script's answer is only logged and a failure never
/// blocks the state machine.
pub struct NotificationScheduler<'a, S> {
    config: Option<&'a NotificationConfig>,
    controller: ControllerId,
    scripts: &'a S,
}

impl<'a, S> NotificationScheduler<'a, S>
where
    S: ScriptRunner + Sync,
{
    pub fn new(config: Option<&'a NotificationConfig>, controller: ControllerId, scripts: &'a S) -> Self {
        Self {
            config,
            controller,
            scripts,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Pause before the next repetition, `None` when notifications do not repeat.
    #[must_use]
    pub fn repeat_pause(&self) -> Option<Duration> {
        self.config
            .and_then(NotificationConfig::repeat_seconds)
            .map(Duration::from_secs)
    }

    /// Invoke the notification script for `targets`.
    pub async fn notify(&self, targets: &[PointId]) {
        let Some(config) = self.config else {
            return;
        };
        let targets = targets
            .iter()
            .map(PointId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let params = serde_json::json!({
            "controller_id": self.controller,
            "targets": targets,
        });
        match self.scripts.invoke(&config.script, params).await {
            Ok(result) => {
                tracing::info!(controller = %self.controller, script = %config.script, %result, "notification sent");
            }
            Err(err) => {
                tracing::warn!(%err, controller = %self.controller, script = %config.script, "notification failed");
            }
        }
    }
}
