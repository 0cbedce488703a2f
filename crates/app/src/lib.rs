//! # ventmon-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PointStore`: read/write points and request actuations
//!   - `ConditionEvaluator`: decide whether a predicate tree passes
//!   - `ScriptRunner`: invoke an external script with JSON parameters
//!   - `StepStore`: persist the episode step of a controller
//!   - `Timer`: single-shot rearmable timer
//!   - `EventPublisher`: publish controller events
//! - Define the **driving/inbound port** `ClosureControl`, implemented by
//!   [`controller::ClosureController`]
//! - Provide the collaborators of the state machine: duration selection,
//!   lowering strategies, notification scheduling
//! - Provide **in-process infrastructure** (event bus, tokio timer, event
//!   runner) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `ventmon-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod condition_evaluator;
pub mod controller;
pub mod duration;
pub mod event_bus;
pub mod lowering;
pub mod notification;
pub mod ports;
pub mod runner;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;
