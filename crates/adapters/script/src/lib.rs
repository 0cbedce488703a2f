//! # ventmon-adapter-script
//!
//! Runs lowering and notification scripts as child processes.
//!
//! ## Protocol
//! - The program is started with the configured arguments
//! - The invocation parameters are written to its stdin as one JSON document
//! - Whatever it prints on stdout is parsed as JSON; empty output means `null`
//! - A non-zero exit status or a run longer than the timeout is an error
//!
//! ## Dependency rule
//! Depends on `ventmon-app` (for the `ScriptRunner` port) and `ventmon-domain`.

pub mod error;
pub mod runner;

pub use error::ScriptError;
pub use runner::{Config, ProcessScriptRunner};
