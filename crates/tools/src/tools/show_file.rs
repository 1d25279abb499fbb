use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::text::{read_text, Lines};
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

pub struct ShowFileTool {
    descriptor: ToolDescriptor,
}

impl ShowFileTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new("show_file", "Show a file with line numbers", SafetyClass::Safe)
                .required("filepath", ParamType::Path, "File to show")
                .optional("line_start", ParamType::Integer, "First line to show (1-based)")
                .optional("line_end", ParamType::Integer, "Last line to show (inclusive)"),
        }
    }
}

impl Default for ShowFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShowFileTool {
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

        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| ToolError::io(&display, e))?;
        if meta.is_dir() {
            return Err(ToolError::ExecutionFailed(format!("{} is a directory", display)));
        }
        if meta.len() > MAX_FILE_SIZE {
            return Err(ToolError::ExecutionFailed(format!("{} is too large to show", display)));
        }

        let lines = Lines::parse(&read_text(path, &display).await?);
        if lines.len() == 0 {
            return Ok(ToolOutput::text(format!("{} is empty", display)));
        }

        let start = invocation.get_i64("line_start").unwrap_or(1);
        let end = invocation
            .get_i64("line_end")
            .unwrap_or(lines.len() as i64)
            .min(lines.len() as i64);
        let (from, to) = lines.range(start, end)?;

        let mut out = vec![format!("{} (lines {}-{} of {})", display, from + 1, to, lines.len())];
        for index in from..to {
            out.push(format!("{:>4} | {}", index + 1, lines.get(index).unwrap_or_default()));
        }
        Ok(ToolOutput::text(out.join("\n")))
    }
}
