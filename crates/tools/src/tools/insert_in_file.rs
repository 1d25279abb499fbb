use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::{change_summary, read_text, write_atomic, Lines};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

pub struct InsertInFileTool {
    descriptor: ToolDescriptor,
}

impl InsertInFileTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "insert_in_file",
                "Insert content after the first line exactly matching after_line",
                SafetyClass::NeedsConfirmation,
            )
            .required("filepath", ParamType::Path, "File to edit")
            .required("after_line", ParamType::String, "Exact text of the anchor line")
            .required("content", ParamType::String, "Content to insert")
            .mutating(),
        }
    }
}

impl Default for InsertInFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for InsertInFileTool {
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
        let anchor = invocation.get_str("after_line").unwrap_or_default();
        let content = invocation.get_str("content").unwrap_or_default();

        let mut lines = Lines::parse(&read_text(path, &display).await?);
        let index = lines
            .position(anchor)
            .ok_or_else(|| ToolError::NotFound(format!("Anchor line not found in {}: {:?}", display, anchor)))?;
        lines.insert_after(Some(index), content);
        write_atomic(&ctx, path, &lines.render()).await?;

        let added: Vec<&str> = content.lines().collect();
        Ok(ToolOutput::text(change_summary(
            &format!("Inserted {} lines after line {} in {}", added.len(), index + 1, display),
            index + 2,
            &[],
            &added,
        )))
    }
}
