//! Event runner: feeds bus events into a controller.

use tokio::sync::broadcast::{self, error::RecvError};
use ventmon_domain::event::ControllerEvent;

use crate::ports::{ClosureControl, Outcome};

/// Dispatch events to `control` until the bus closes.
///
/// Changes of unwatched points are ignored. When the receiver lagged
/// behind, one catch-up evaluation replaces the dropped events.
pub async fn run<C>(control: C, mut events: broadcast::Receiver<ControllerEvent>)
where
    C: ClosureControl,
{
    loop {
        let result = match events.recv().await {
            Ok(ControllerEvent::PointChanged { point }) => {
                if !control.watches(&point) {
                    continue;
                }
                tracing::debug!(%point, "watched point changed");
                control.evaluate().await
            }
            Ok(ControllerEvent::EvaluateRequested) => control.evaluate().await,
            Ok(ControllerEvent::TimerFired) => control.on_timer_fire().await,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event runner lagged, evaluating to catch up");
                control.evaluate().await
            }
            Err(RecvError::Closed) => {
                tracing::info!("event bus closed, runner stopping");
                return;
            }
        };
        match result {
            Ok(Outcome::Busy) => tracing::debug!("controller busy, event skipped"),
            Ok(_) => {}
            Err(err) => tracing::error!(%err, "controller evaluation failed"),
        }
    }
}
