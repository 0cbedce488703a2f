//! Child-process implementation of [`ScriptRunner`].

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use ventmon_app::ports::ScriptRunner;
use ventmon_domain::error::VentmonError;
use ventmon_domain::lowering::ScriptRef;

use crate::error::ScriptError;

/// Configuration for the process runner.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound for a single invocation.
    pub timeout: Duration,
    /// Directory the scripts are started in, the current one when unset.
    pub working_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            working_dir: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn build(self) -> ProcessScriptRunner {
        ProcessScriptRunner { config: self }
    }
}

/// Spawns one child process per invocation.
#[derive(Debug, Clone)]
pub struct ProcessScriptRunner {
    config: Config,
}

impl ProcessScriptRunner {
    async fn run(
        &self,
        script: &ScriptRef,
        input: Vec<u8>,
    ) -> Result<std::process::Output, ScriptError> {
        let io_err = |source| ScriptError::Io {
            program: script.program.clone(),
            source,
        };

        let mut command = Command::new(&script.program);
        command.kill_on_drop(true);
        command.args(&script.args);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(io_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            // a script may exit without reading its parameters
            if let Err(err) = stdin.write_all(&input).await
                && err.kind() != std::io::ErrorKind::BrokenPipe
            {
                return Err(io_err(err));
            }
        }
        child.wait_with_output().await.map_err(io_err)
    }
}

fn parse_output(program: &str, stdout: &[u8]) -> Result<serde_json::Value, ScriptError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(|source| ScriptError::BadOutput {
        program: program.to_string(),
        source,
    })
}

impl ScriptRunner for ProcessScriptRunner {
    #[tracing::instrument(skip(self, script, params), fields(script = %script))]
    async fn invoke(
        &self,
        script: &ScriptRef,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, VentmonError> {
        let input = params.to_string().into_bytes();
        let output = timeout(self.config.timeout, self.run(script, input))
            .await
            .map_err(|_| ScriptError::Timeout {
                program: script.program.clone(),
                timeout_ms: self.config.timeout.as_millis(),
            })??;

        if !output.status.success() {
            return Err(ScriptError::NonZeroExit {
                program: script.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let answer = parse_output(&script.program, &output.stdout)?;
        tracing::debug!(answer = %answer, "script finished");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn shell(body: &str) -> ScriptRef {
        ScriptRef {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), body.to_string()],
        }
    }

    #[tokio::test]
    async fn should_stream_params_and_parse_answer() {
        let runner = Config::default().build();
        let answer = runner
            .invoke(&shell("cat"), json!({"lower": {"a": 1}}))
            .await
            .unwrap();
        assert_eq!(answer, json!({"lower": {"a": 1}}));
    }

    #[tokio::test]
    async fn should_answer_null_when_script_prints_nothing() {
        let runner = Config::default().build();
        let answer = runner
            .invoke(&shell("cat > /dev/null"), json!({}))
            .await
            .unwrap();
        assert_eq!(answer, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn should_fail_when_script_exits_with_error() {
        let runner = Config::default().build();
        let result = runner
            .invoke(&shell("echo boom >&2; exit 3"), json!({}))
            .await;
        assert!(matches!(result, Err(VentmonError::Script(_))));
    }

    #[tokio::test]
    async fn should_fail_when_answer_is_not_json() {
        let runner = Config::default().build();
        let result = runner.invoke(&shell("echo not-json"), json!({})).await;
        assert!(matches!(result, Err(VentmonError::Script(_))));
    }

    #[tokio::test]
    async fn should_fail_when_program_is_missing() {
        let runner = Config::default().build();
        let result = runner
            .invoke(&ScriptRef::new("/nonexistent/ventmon-script"), json!({}))
            .await;
        assert!(matches!(result, Err(VentmonError::Script(_))));
    }

    #[tokio::test]
    async fn should_time_out_when_script_hangs() {
        let runner = Config {
            timeout: Duration::from_millis(100),
            working_dir: None,
        }
        .build();
        let result = runner.invoke(&shell("sleep 5"), json!({})).await;
        let Err(VentmonError::Script(err)) = result else {
            panic!("expected a script error");
        };
        assert!(err.to_string().contains("did not finish"));
    }

    #[test]
    fn should_parse_trimmed_output() {
        let value = parse_output("x", b"  {\"save\": {}}\n").unwrap();
        assert_eq!(value, json!({"save": {}}));
    }
}
