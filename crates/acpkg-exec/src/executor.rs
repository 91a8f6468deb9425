use std::process::{ExitStatus, Stdio};

use crate::error::ExecError;
use crate::invocation::Invocation;

/// Abstraction over subprocess execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ProcessExecutor: Send + Sync {
    /// Run to completion with inherited stdio and return the exit code.
    ///
    /// A non-zero exit is not an error here; the caller decides.
    async fn status(&self, invocation: &Invocation) -> Result<i32, ExecError>;

    /// Run to completion and capture stdout. A non-zero exit is an error.
    async fn output(&self, invocation: &Invocation) -> Result<String, ExecError>;
}

/// Spawns real child processes.
#[derive(Debug, Default)]
pub struct RealExecutor;

impl ProcessExecutor for RealExecutor {
    async fn status(&self, invocation: &Invocation) -> Result<i32, ExecError> {
        tracing::debug!(cwd = ?invocation.cwd, "exec: {invocation}");

        let status = command(invocation)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecError::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        Ok(exit_code(status))
    }

    async fn output(&self, invocation: &Invocation) -> Result<String, ExecError> {
        tracing::debug!(cwd = ?invocation.cwd, "exec (captured): {invocation}");

        let output = command(invocation)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecError::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ExecError::InvalidUtf8 {
                program: invocation.program.clone(),
                source: e,
            })
        } else {
            Err(ExecError::Failed {
                program: invocation.program.clone(),
                code: exit_code(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

fn command(invocation: &Invocation) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(&invocation.program);
    cmd.args(&invocation.args);
    if let Some(dir) = &invocation.cwd {
        cmd.current_dir(dir);
    }
    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }
    cmd
}

/// Map an exit status to a shell-style exit code.
///
/// A child killed by a signal reports `128 + signal`, as shells do.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
