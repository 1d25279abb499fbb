use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::{change_summary, read_text, write_atomic, Lines};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

pub struct ReplaceLinesTool {
    descriptor: ToolDescriptor,
}

impl ReplaceLinesTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "replace_lines",
                "Replace lines line_start..=line_end (1-based) with new_content",
                SafetyClass::NeedsConfirmation,
            )
            .required("filepath", ParamType::Path, "File to edit")
            .required("line_start", ParamType::Integer, "First line to replace (1-based)")
            .required("line_end", ParamType::Integer, "Last line to replace (inclusive)")
            .required("new_content", ParamType::String, "Replacement text")
            .mutating(),
        }
    }
}

impl Default for ReplaceLinesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ReplaceLinesTool {
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
        let new_content = invocation.get_str("new_content").unwrap_or_default();

        let mut lines = Lines::parse(&read_text(path, &display).await?);
        let (from, to) = lines.range(start, end)?;
        let removed = lines.splice(from, to, new_content);
        write_atomic(&ctx, path, &lines.render()).await?;

        let added: Vec<&str> = new_content.lines().collect();
        Ok(ToolOutput::text(change_summary(
            &format!(
                "Replaced lines {}-{} in {} ({} -> {} lines)",
                start,
                end,
                display,
                removed.len(),
                added.len()
            ),
            from + 1,
            &removed,
            &added,
        )))
    }
}
