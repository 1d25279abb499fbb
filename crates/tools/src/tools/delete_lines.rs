use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::{change_summary, read_text, write_atomic, Lines};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

pub struct DeleteLinesTool {
    descriptor: ToolDescriptor,
}

impl DeleteLinesTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "delete_lines",
                "Delete lines line_start..=line_end (1-based)",
                SafetyClass::NeedsConfirmation,
            )
            .required("filepath", ParamType::Path, "File to edit")
            .required("line_start", ParamType::Integer, "First line to delete (1-based)")
            .required("line_end", ParamType::Integer, "Last line to delete (inclusive)")
            .mutating(),
        }
    }
}

impl Default for DeleteLinesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for DeleteLinesTool {
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
        let start = invocation.get_i64("line_start").unwrap_or(0);
        let end = invocation.get_i64("line_end").unwrap_or(0);

        let mut lines = Lines::parse(&read_text(path, &display).await?);
        let (from, to) = lines.range(start, end)?;
        let removed = lines.splice(from, to, "");
        write_atomic(&ctx, path, &lines.render()).await?;

        Ok(ToolOutput::text(change_summary(
            &format!("Deleted lines {}-{} from {}", start, end, display),
            from + 1,
            &removed,
            &[],
        )))
    }
}
