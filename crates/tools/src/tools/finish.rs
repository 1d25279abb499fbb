use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;

/// Ends the agent turn. No filesystem side effect.
pub struct FinishTool {
    descriptor: ToolDescriptor,
}

impl FinishTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new("finish", "Declare the task complete", SafetyClass::Safe)
                .optional("summary", ParamType::String, "What was done"),
        }
    }
}

impl Default for FinishTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FinishTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        _ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let text = invocation
            .get_str("summary")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Task complete")
            .to_string();
        Ok(ToolOutput { text, finish: true })
    }
}
