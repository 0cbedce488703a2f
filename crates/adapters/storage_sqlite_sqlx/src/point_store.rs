//! `SQLite` implementation of [`PointStore`].
//!
//! Values are stored as JSON so that their type survives the round trip.
//! Actuation requests are journaled and also become the point's value.

use sqlx::SqlitePool;
use ventmon_app::ports::PointStore;
use ventmon_domain::error::VentmonError;
use ventmon_domain::point::{PointId, PointValue};

use crate::error::StorageError;

/// `SQLite`-backed point store.
#[derive(Clone)]
pub struct SqlitePointStore {
    pool: SqlitePool,
}

impl SqlitePointStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Actuation requests recorded for `point`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query or decoding fails.
    pub async fn actuations(&self, point: &PointId) -> Result<Vec<PointValue>, VentmonError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT value FROM actuation_requests WHERE point_id = ? ORDER BY id",
        )
        .bind(point.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|(json,)| {
                serde_json::from_str(&json)
                    .map_err(|err| VentmonError::from(StorageError::from(err)))
            })
            .collect()
    }

    async fn upsert(&self, id: &PointId, json: &str, at: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO points (id, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(id.as_str())
        .bind(json)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl PointStore for SqlitePointStore {
    async fn read_point(&self, id: &PointId) -> Result<Option<PointValue>, VentmonError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM points WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let Some((json,)) = row else {
            return Ok(None);
        };
        let value = serde_json::from_str(&json).map_err(StorageError::from)?;
        Ok(Some(value))
    }

    async fn write_point(&self, id: &PointId, value: PointValue) -> Result<(), VentmonError> {
        let json = serde_json::to_string(&value).map_err(StorageError::from)?;
        let now = ventmon_domain::time::now().to_rfc3339();
        self.upsert(id, &json, &now).await?;
        Ok(())
    }

    async fn request_actuation(&self, id: &PointId, value: PointValue) -> Result<(), VentmonError> {
        let json = serde_json::to_string(&value).map_err(StorageError::from)?;
        let now = ventmon_domain::time::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO actuation_requests (point_id, value, requested_at) VALUES (?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(&json)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;
        sqlx::query(
            "INSERT INTO points (id, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(id.as_str())
        .bind(&json)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;
        tracing::debug!(point = %id, value = %json, "actuation recorded");
        Ok(())
    }
}
