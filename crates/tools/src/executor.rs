use crate::descriptor::SafetyClass;
use crate::error::{ToolError, ValidationError};
use crate::execution_context::ExecutionContext;
use crate::invocation::ToolInvocation;
use crate::registry::ToolRegistry;
use crate::sandbox::{CommandGuard, PathGuard, RootLocks};
use crate::traits::{Confirmer, ToolOutput};
use monk_core::{ErrorKind, ToolResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout, Duration};
use tracing::{error, info, warn};

/// How needs-confirmation invocations are approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPolicy {
    #[default]
    Prompt,
    AutoApprove,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionPolicy {
    pub confirmation: ConfirmationPolicy,
}

/// Executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub timeout_ms: u64,
    pub max_output_bytes: usize,
    pub extra_deny_patterns: Vec<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_output_bytes: 16 * 1024,
            extra_deny_patterns: Vec::new(),
        }
    }
}

/// Runs validated invocations for one session, one at a time.
pub struct ToolExecutor {
    session_id: String,
    registry: Arc<ToolRegistry>,
    path_guard: PathGuard,
    command_guard: CommandGuard,
    root_locks: RootLocks,
    confirmer: Arc<dyn Confirmer>,
    config: ExecutorConfig,
    in_flight: Mutex<()>,
}

impl ToolExecutor {
    pub fn new(
        session_id: impl Into<String>,
        sandbox_root: impl AsRef<Path>,
        registry: Arc<ToolRegistry>,
        confirmer: Arc<dyn Confirmer>,
        root_locks: RootLocks,
        config: ExecutorConfig,
    ) -> Result<Self, ToolError> {
        let path_guard = PathGuard::new(sandbox_root)?;
        let command_guard = CommandGuard::new(&config.extra_deny_patterns)?;
        root_locks.register(path_guard.root());
        Ok(Self {
            session_id: session_id.into(),
            registry,
            path_guard,
            command_guard,
            root_locks,
            confirmer,
            config,
            in_flight: Mutex::new(()),
        })
    }

    pub fn sandbox_root(&self) -> &Path {
        self.path_guard.root()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn execute(&self, invocation: &ToolInvocation, policy: &ExecutionPolicy) -> ToolResult {
        let _slot = self.in_flight.lock().await;
        let id = invocation.id();
        let name = invocation.name();
        info!("Dispatching tool: {} for session: {}", name, self.session_id);

        let Some(tool) = self.registry.get(name) else {
            return ToolResult::failure(id, name, ErrorKind::ValidationError, format!("Tool not found: {}", name));
        };

        // Deny-list overrides the declared class and any confirmation outcome.
        for command in invocation.command_params() {
            if let Some(rule) = self.command_guard.check(command) {
                warn!("Blocked command ({}) for session {}: {}", rule.category, self.session_id, command);
                return ToolResult::denied(
                    id,
                    name,
                    Some(ErrorKind::SafetyBlocked),
                    format!("Command blocked by safety rule: {}", rule.category),
                );
            }
        }

        if invocation.safety() == SafetyClass::Blocked {
            warn!("Tool {} is blocked", name);
            return ToolResult::failure(id, name, ErrorKind::SafetyBlocked, format!("Tool {} is blocked", name));
        }

        let mut ctx = ExecutionContext::new(
            self.session_id.clone(),
            id,
            self.path_guard.root(),
            self.config.timeout_ms,
        );
        for (param, raw) in invocation.path_params() {
            match self.path_guard.resolve(raw) {
                Ok(resolved) => ctx = ctx.with_path(param, resolved),
                Err(e) => {
                    warn!("Path violation for {}: {}", name, e);
                    return ToolResult::failure(id, name, e.kind(), e.to_string());
                }
            }
        }

        if invocation.safety() == SafetyClass::NeedsConfirmation
            && policy.confirmation == ConfirmationPolicy::Prompt
        {
            let description = invocation.describe();
            if !self.confirmer.confirm(&description).await {
                info!("Operator declined {}", description);
                return ToolResult::denied(id, name, None, "Operator declined the tool call");
            }
        }

        // Shell commands can touch any file under the root.
        if invocation.mutates_files() || invocation.command_params().next().is_some() {
            ctx = ctx.with_root_lock(self.root_locks.acquire(self.path_guard.root()).await);
        }

        match self.execute_with_protection(tool, ctx, invocation.clone()).await {
            Ok(output) => {
                let mut result = ToolResult::success(id, name, truncate(output.text, self.config.max_output_bytes));
                result.finish = output.finish;
                result
            }
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                ToolResult::failure(id, name, e.kind(), truncate(e.to_string(), self.config.max_output_bytes))
            }
        }
    }

    async fn execute_with_protection(
        &self,
        tool: Arc<dyn crate::traits::Tool>,
        ctx: ExecutionContext,
        invocation: ToolInvocation,
    ) -> Result<ToolOutput, ToolError> {
        let timeout_ms = ctx.timeout_ms;

        // Spawn task to isolate panics
        let mut handle = tokio::spawn(async move { tool.execute(ctx, invocation).await });

        match timeout(Duration::from_millis(timeout_ms), &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                if join_err.is_panic() {
                    error!("Tool execution panicked");
                } else {
                    error!("Tool execution cancelled");
                }
                Err(ToolError::Internal)
            }
            Err(_) => {
                handle.abort();
                // Wait for the aborted task to unwind so its context, and any
                // root lock it holds, is dropped before the result is reported.
                let _ = handle.await;
                warn!("Tool execution timed out after {}ms", timeout_ms);
                Err(ToolError::Timeout)
            }
        }
    }
}

/// Observation for a candidate that failed validation.
pub fn validation_failure(tool: &str, err: &ValidationError) -> ToolResult {
    ToolResult::failure(
        uuid::Uuid::new_v4().to_string(),
        tool,
        ErrorKind::ValidationError,
        err.to_string(),
    )
}

/// Cut `text` to at most `max_bytes` on a char boundary, with a marker.
pub fn truncate(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let omitted = text.len() - cut;
    text.truncate(cut);
    text.push_str(&format!("\n[output truncated: {} bytes omitted]", omitted));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_untouched() {
        assert_eq!(truncate("abc".into(), 10), "abc");
    }

    #[test]
    fn test_truncate_char_boundary() {
        let out = truncate("ééé".into(), 3);
        assert!(out.starts_with("é\n[output truncated: 4 bytes omitted]"));
    }

    #[test]
    fn test_confirmation_policy_serde() {
        let policy: ConfirmationPolicy = serde_json::from_str(r#""auto_approve""#).unwrap();
        assert_eq!(policy, ConfirmationPolicy::AutoApprove);
    }
}
