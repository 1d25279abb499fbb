use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::write_atomic;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use tokio::fs;

pub struct CreateFileTool {
    descriptor: ToolDescriptor,
}

impl CreateFileTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "create_file",
                "Create a file with the given content",
                SafetyClass::NeedsConfirmation,
            )
            .required("filepath", ParamType::Path, "File to create")
            .required("content", ParamType::String, "Full file content")
            .optional("overwrite", ParamType::Boolean, "Replace an existing file")
            .mutating(),
        }
    }
}

impl Default for CreateFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for CreateFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let path = ctx.path("filepath")?;
        let display = ctx.display_path(path);
        let content = invocation.get_str("content").unwrap_or_default();
        let overwrite = invocation.get_bool("overwrite").unwrap_or(false);

        let existed = fs::try_exists(path).await.unwrap_or(false);
        if existed && !overwrite {
            return Err(ToolError::ExecutionFailed(format!(
                "{} already exists; pass overwrite=true to replace it",
                display
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;
        }
        write_atomic(&ctx, path, content).await?;

        let verb = if existed { "Overwrote" } else { "Created" };
        Ok(ToolOutput::text(format!(
            "{} {} ({} lines, {} bytes)",
            verb,
            display,
            content.lines().count(),
            content.len()
        )))
    }
}
