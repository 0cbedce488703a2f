//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod condition;
pub mod control;
pub mod event_bus;
pub mod points;
pub mod script;
pub mod step_store;
pub mod timer;

pub use condition::ConditionEvaluator;
pub use control::{ClosureControl, Outcome};
pub use event_bus::EventPublisher;
pub use points::PointStore;
pub use script::ScriptRunner;
pub use step_store::StepStore;
pub use timer::Timer;
