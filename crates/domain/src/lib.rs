//! # ventmon-domain
//!
//! Pure domain model for the ventmon ventilation controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Points** (sensor and actuator values addressed by identifier)
//! - Define **Conditions** (boolean predicate trees over points)
//! - Define the **closure state** (closed / tilted / open) and the persisted
//!   **episode step** (idle → delay → lowered → notified)
//! - Define **duration rules**, **lowering** and **notification** policies
//! - Provide the **psychrometric calculator** (dew point, humidity, mold risk)
//! - Validate a controller configuration before it is applied
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod closure;
pub mod condition;
pub mod config;
pub mod duration;
pub mod event;
pub mod lowering;
pub mod notification;
pub mod point;
pub mod psychro;
pub mod status;
pub mod step;
pub mod time_unit;
