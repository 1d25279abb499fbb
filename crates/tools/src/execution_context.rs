use crate::error::ToolError;
use crate::sandbox::RootLockGuard;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Per-invocation context handed to a tool handler.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub session_id: String,
    pub invocation_id: String,
    pub sandbox_root: PathBuf,
    pub timeout_ms: u64,
    resolved_paths: HashMap<String, PathBuf>,
    root_lock: Option<Arc<RootLockGuard>>,
}

impl ExecutionContext {
    pub fn new(
        session_id: impl Into<String>,
        invocation_id: impl Into<String>,
        sandbox_root: impl Into<PathBuf>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            invocation_id: invocation_id.into(),
            sandbox_root: sandbox_root.into(),
            timeout_ms,
            resolved_paths: HashMap::new(),
            root_lock: None,
        }
    }

    pub(crate) fn with_path(mut self, param: &str, path: PathBuf) -> Self {
        self.resolved_paths.insert(param.to_string(), path);
        self
    }

    pub(crate) fn with_root_lock(mut self, guard: RootLockGuard) -> Self {
        self.root_lock = Some(Arc::new(guard));
        self
    }

    /// Shared handle on the held root lock; the lock is released once every
    /// handle is dropped.
    pub(crate) fn root_lock(&self) -> Option<Arc<RootLockGuard>> {
        self.root_lock.clone()
    }

    /// Sandbox-checked absolute path for a path-typed parameter.
    pub fn path(&self, param: &str) -> Result<&Path, ToolError> {
        self.resolved_paths
            .get(param)
            .map(PathBuf::as_path)
            .ok_or_else(|| ToolError::ValidationError(format!("Unresolved path parameter: {}", param)))
    }

    /// Path relative to the sandbox root, for messages.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.sandbox_root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
