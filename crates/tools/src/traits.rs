use crate::descriptor::ToolDescriptor;
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use async_trait::async_trait;

/// Successful tool output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    /// Ask the agent loop to stop after this turn.
    pub finish: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish: false,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn execute(
        &self,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError>;
}

/// Asks the operator to approve a needs-confirmation invocation.
///
/// Blocks only the issuing session.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, description: &str) -> bool;
}

/// Approves everything.
pub struct AutoApprove;

#[async_trait]
impl Confirmer for AutoApprove {
    async fn confirm(&self, _description: &str) -> bool {
        true
    }
}

/// Declines everything.
pub struct DenyAll;

#[async_trait]
impl Confirmer for DenyAll {
    async fn confirm(&self, _description: &str) -> bool {
        false
    }
}
