//! # ventmon-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `PointStore` and `StepStore` ports defined in `ventmon-app`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `ventmon-app` (for port traits) and `ventmon-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod point_store;
pub mod pool;
pub mod step_store;

pub use error::StorageError;
pub use point_store::SqlitePointStore;
pub use pool::{Config, Database};
pub use step_store::SqliteStepStore;
