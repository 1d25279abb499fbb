use super::process;
use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

pub struct ExecuteCommandTool {
    descriptor: ToolDescriptor,
}

impl ExecuteCommandTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "execute_command",
                "Run a shell command in the sandbox root",
                SafetyClass::NeedsConfirmation,
            )
            .required("command", ParamType::Command, "Shell command line")
            .mutating(),
        }
    }
}

impl Default for ExecuteCommandTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let command = invocation
            .get_str("command")
            .ok_or_else(|| ToolError::ValidationError("Empty command".into()))?;

        let mut cmd = process::sandboxed("sh", &ctx.sandbox_root);
        cmd.arg("-c").arg(command);
        process::run(cmd, "sh").await
    }
}
