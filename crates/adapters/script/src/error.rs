//! Script execution errors.

use ventmon_domain::error::VentmonError;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// The process could not be spawned or its pipes failed.
    #[error("unable to run {program}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout_ms}ms")]
    Timeout { program: String, timeout_ms: u128 },

    #[error("{program} exited with status {code:?}: {stderr}")]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Stdout was not a JSON document.
    #[error("{program} answered with invalid JSON")]
    BadOutput {
        program: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ScriptError> for VentmonError {
    fn from(err: ScriptError) -> Self {
        Self::Script(Box::new(err))
    }
}
