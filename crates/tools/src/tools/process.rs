//! Child-process plumbing shared by the shell-backed tools.

use crate::error::ToolError;
use crate::traits::ToolOutput;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// `program` run from `root` with a scrubbed environment (PATH and HOME only).
///
/// The executor's timeout drops the output future, and kill_on_drop reaps
/// the child.
pub(crate) fn sandboxed(program: &str, root: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.current_dir(root)
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_else(|_| DEFAULT_PATH.to_string()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Ok(home) = std::env::var("HOME") {
        cmd.env("HOME", home);
    }
    cmd
}

/// Run to completion and render exit code, stdout and stderr.
/// A non-zero exit is an `ExecutionFailed` carrying the same rendering.
pub(crate) async fn run(mut cmd: Command, program: &str) -> Result<ToolOutput, ToolError> {
    let output = cmd.output().await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ToolError::ExecutionFailed(format!("{} not found on PATH", program)),
        _ => ToolError::ExecutionFailed(e.to_string()),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut text = format!("exit code: {}", exit_label(output.status.code()));
    if !stdout.is_empty() {
        text.push_str("\nstdout:\n");
        text.push_str(stdout.trim_end());
    }
    if !stderr.is_empty() {
        text.push_str("\nstderr:\n");
        text.push_str(stderr.trim_end());
    }

    if output.status.success() {
        Ok(ToolOutput::text(text))
    } else {
        Err(ToolError::ExecutionFailed(text))
    }
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| c.to_string())
}
