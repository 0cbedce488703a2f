//! Events that drive a controller.

use crate::point::PointId;

/// Something the event runner dispatches to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A point was written; the runner ignores points the controller does
    /// not watch.
    PointChanged { point: PointId },
    /// The single-shot controller timer elapsed.
    TimerFired,
    /// Manual "evaluate now".
    EvaluateRequested,
}
