//! # ventmon-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the operator JSON API (`/api/status`, `/api/evaluate`,
//!   `/api/points/{id}`, `/api/calibration`)
//! - Map HTTP requests onto the `ClosureControl` driving port and the
//!   point store
//! - Map [`VentmonError`](ventmon_domain::error::VentmonError) into status codes
//!
//! ## Dependency rule
//! Depends on `ventmon-app` (for port traits) and `ventmon-domain` (for domain
//! types used in request/response mapping). Never leaks axum types into the
//! domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
