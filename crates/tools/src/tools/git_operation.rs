use super::process;
use crate::descriptor::{ParamType, SafetyClass, ToolDescriptor};
use crate::error::ToolError;
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::traits::{Tool, ToolOutput};
use async_trait::async_trait;
use tracing::debug;

const DEFAULT_COMMIT_MESSAGE: &str = "AI assistant changes";

/// Supported operations and their fixed git arguments.
const OPERATIONS: &[(&str, &[&str])] = &[
    ("status", &["status"]),
    ("add", &["add", "."]),
    ("commit", &["commit", "-m"]),
    ("push", &["push"]),
    ("pull", &["pull"]),
    ("log", &["log", "--oneline", "-10"]),
];

/// Runs one of a fixed set of git operations in the sandbox root.
/// Arguments are passed directly to `git`, never through a shell.
pub struct GitOperationTool {
    descriptor: ToolDescriptor,
}

impl GitOperationTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "git_operation",
                "Run a git operation (status, add, commit, push, pull, log) in the sandbox root",
                SafetyClass::NeedsConfirmation,
            )
            .required("operation", ParamType::String, "One of status, add, commit, push, pull, log")
            .optional("commit_message", ParamType::String, "Message for the commit operation")
            .mutating(),
        }
    }
}

impl Default for GitOperationTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Full git argument list for `operation`.
pub(crate) fn git_args(operation: &str, commit_message: Option<&str>) -> Result<Vec<String>, ToolError> {
    let (_, args) = OPERATIONS
        .iter()
        .find(|(name, _)| *name == operation)
        .ok_or_else(|| {
            let known: Vec<&str> = OPERATIONS.iter().map(|(name, _)| *name).collect();
            ToolError::ValidationError(format!(
                "Unknown git operation: {}. Available: {}",
                operation,
                known.join(", ")
            ))
        })?;

    let mut out: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    if operation == "commit" {
        let message = commit_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_COMMIT_MESSAGE);
        out.push(message.to_string());
    }
    Ok(out)
}

#[async_trait]
impl Tool for GitOperationTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(
        &self,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let operation = invocation.get_str("operation").unwrap_or_default().trim();
        let args = git_args(operation, invocation.get_str("commit_message"))?;
        debug!("git {} in {}", args.join(" "), ctx.sandbox_root.display());

        let mut cmd = process::sandboxed("git", &ctx.sandbox_root);
        cmd.args(&args).env("GIT_TERMINAL_PROMPT", "0");

        match process::run(cmd, "git").await {
            Ok(output) => Ok(ToolOutput::text(format!("git {}\n{}", operation, output.text))),
            Err(ToolError::ExecutionFailed(text)) => {
                let mut text = format!("git {} failed\n{}", operation, text);
                if text.contains("exit code: 128") && matches!(operation, "push" | "pull") {
                    text.push_str("\nhint: exit code 128 usually means the remote rejected the credentials");
                }
                Err(ToolError::ExecutionFailed(text))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_args() {
        assert_eq!(git_args("status", None).unwrap(), vec!["status"]);
        assert_eq!(git_args("log", None).unwrap(), vec!["log", "--oneline", "-10"]);
        assert_eq!(
            git_args("commit", Some("Fix parser; rm -rf /")).unwrap(),
            vec!["commit", "-m", "Fix parser; rm -rf /"]
        );
        assert_eq!(git_args("commit", Some("  ")).unwrap(), vec!["commit", "-m", DEFAULT_COMMIT_MESSAGE]);
    }

    #[test]
    fn test_unknown_operation() {
        let err = git_args("rebase", None).unwrap_err();
        assert!(matches!(err, ToolError::ValidationError(ref m) if m.contains("status, add, commit")));
    }
}
