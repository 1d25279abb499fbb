use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::{read_text, write_atomic, Lines};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

pub struct AppendToFileTool {
    descriptor: ToolDescriptor,
}

impl AppendToFileTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "append_to_file",
                "Append content to the end of an existing file",
                SafetyClass::NeedsConfirmation,
            )
            .required("filepath", ParamType::Path, "File to extend")
            .required("content", ParamType::String, "Content to append")
            .mutating(),
        }
    }
}

impl Default for AppendToFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for AppendToFileTool {
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

        let mut lines = Lines::parse(&read_text(path, &display).await?);
        let first_new = lines.len() + 1;
        let added = lines.append(content);
        write_atomic(&ctx, path, &lines.render()).await?;

        Ok(ToolOutput::text(format!(
            "Appended {} lines to {} (now lines {}-{})",
            added,
            display,
            first_new,
            lines.len()
        )))
    }
}
