use super::process;
use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const PYTHON: &str = "python3";

/// Writes a throwaway script into the sandbox root, runs it, removes it.
pub struct RunPythonTool {
    descriptor: ToolDescriptor,
}

impl RunPythonTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "run_python",
                "Execute Python code from a temporary script in the sandbox root",
                SafetyClass::NeedsConfirmation,
            )
            .required("script_content", ParamType::String, "Python source to run")
            .optional("script_name", ParamType::Path, "File name for the temporary script")
            .mutating(),
        }
    }
}

impl Default for RunPythonTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the script on drop, including when the task is aborted.
struct TempScript(PathBuf);

impl Drop for TempScript {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!("Removed temporary script {}", self.0.display()),
            Err(e) => warn!("Failed to remove temporary script {}: {}", self.0.display(), e),
        }
    }
}

async fn write_script(path: &Path, content: &str, display: &str) -> Result<TempScript, ToolError> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                ToolError::ExecutionFailed(format!("{} already exists; choose another script_name", display))
            }
            _ => ToolError::io(display, e),
        })?;
    let script = TempScript(path.to_path_buf());
    file.write_all(content.as_bytes())
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to write script: {}", e)))?;
    file.flush()
        .await
        .map_err(|e| ToolError::ExecutionFailed(format!("Failed to write script: {}", e)))?;
    Ok(script)
}

#[async_trait]
impl Tool for RunPythonTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let content = invocation.get_str("script_content").unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ToolError::ValidationError("script_content is empty".into()));
        }

        let path = match invocation.get_str("script_name") {
            Some(_) => {
                let path = ctx.path("script_name")?.to_path_buf();
                if path.extension().and_then(|e| e.to_str()) != Some("py") {
                    return Err(ToolError::ValidationError("script_name must end in .py".into()));
                }
                path
            }
            None => ctx
                .sandbox_root
                .join(format!(".monk_script_{}.py", uuid::Uuid::new_v4().simple())),
        };
        let display = ctx.display_path(&path);

        let script = write_script(&path, content, &display).await?;
        let mut cmd = process::sandboxed(PYTHON, &ctx.sandbox_root);
        cmd.arg(&script.0);
        let result = process::run(cmd, PYTHON).await;
        drop(script);

        result.map(|output| ToolOutput::text(format!("python {}\n{}", display, output.text)))
    }
}
