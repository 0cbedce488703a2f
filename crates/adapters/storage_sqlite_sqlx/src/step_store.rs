//! `SQLite` implementation of [`StepStore`].

use sqlx::SqlitePool;
use ventmon_app::ports::StepStore;
use ventmon_domain::error::VentmonError;
use ventmon_domain::id::ControllerId;
use ventmon_domain::step::Step;

use crate::error::StorageError;

/// `SQLite`-backed step store, one row per controller.
#[derive(Clone)]
pub struct SqliteStepStore {
    pool: SqlitePool,
}

impl SqliteStepStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl StepStore for SqliteStepStore {
    async fn load(&self, controller: ControllerId) -> Result<Option<Step>, VentmonError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT step FROM controller_steps WHERE controller_id = ?")
                .bind(controller.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        let Some((json,)) = row else {
            return Ok(None);
        };
        let step = serde_json::from_str(&json).map_err(StorageError::from)?;
        Ok(Some(step))
    }

    async fn persist(&self, controller: ControllerId, step: &Step) -> Result<(), VentmonError> {
        let json = serde_json::to_string(step).map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO controller_steps (controller_id, step, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (controller_id) DO UPDATE SET step = excluded.step, updated_at = excluded.updated_at",
        )
        .bind(controller.to_string())
        .bind(&json)
        .bind(ventmon_domain::time::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }
}
