//! Point store port: sensor and actuator values addressed by identifier.

use std::future::Future;

use ventmon_domain::error::VentmonError;
use ventmon_domain::point::{PointId, PointValue};

/// Access to live point values.
pub trait PointStore {
    /// Read the current value of a point, `None` when it has never been set.
    fn read_point(
        &self,
        id: &PointId,
    ) -> impl Future<Output = Result<Option<PointValue>, VentmonError>> + Send;

    /// Set a point value directly (sensor readings, published outputs).
    fn write_point(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send;

    /// Command an actuator to a value.
    ///
    /// Unlike [`write_point`](Self::write_point) this is a commanded change
    /// that downstream drivers act upon.
    fn request_actuation(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send;
}

impl<T: PointStore + Send + Sync> PointStore for std::sync::Arc<T> {
    fn read_point(
        &self,
        id: &PointId,
    ) -> impl Future<Output = Result<Option<PointValue>, VentmonError>> + Send {
        (**self).read_point(id)
    }

    fn write_point(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        (**self).write_point(id, value)
    }

    fn request_actuation(
        &self,
        id: &PointId,
        value: PointValue,
    ) -> impl Future<Output = Result<(), VentmonError>> + Send {
        (**self).request_actuation(id, value)
    }
}
