//! Script runner port: pluggable lowering and notification actions.

use std::future::Future;

use ventmon_domain::error::VentmonError;
use ventmon_domain::lowering::ScriptRef;

/// Invokes an external script with JSON parameters.
///
/// The call is bounded by the adapter; the controller waits for it.
pub trait ScriptRunner {
    /// Run `script` with `params` and return whatever it answered.
    /// A script that answers nothing yields [`serde_json::Value::Null`].
    fn invoke(
        &self,
        script: &ScriptRef,
        params: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, VentmonError>> + Send;
}

impl<T: ScriptRunner + Send + Sync> ScriptRunner for std::sync::Arc<T> {
    fn invoke(
        &self,
        script: &ScriptRef,
        params: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, VentmonError>> + Send {
        (**self).invoke(script, params)
    }
}
