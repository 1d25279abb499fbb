use crate::error::ToolError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Confines path parameters to a sandbox root.
#[derive(Debug, Clone)]
pub struct PathGuard {
    sandbox_root: PathBuf,
}

impl PathGuard {
    pub fn new(sandbox_root: impl AsRef<Path>) -> Result<Self, ToolError> {
        let root = fs::canonicalize(sandbox_root)
            .map_err(|e| ToolError::PathViolation(format!("Invalid sandbox root: {}", e)))?;
        Ok(Self { sandbox_root: root })
    }

    pub fn root(&self) -> &Path {
        &self.sandbox_root
    }

    /// Resolve `raw` to an absolute path inside the sandbox.
    ///
    /// Relative paths are taken from the root. The deepest existing ancestor
    /// is canonicalized so symlinks cannot lead outside; the target itself
    /// need not exist. The root itself is not a valid target.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, ToolError> {
        if raw.trim().is_empty() || raw.contains('\0') {
            return Err(ToolError::PathViolation("Empty or malformed path".into()));
        }

        let joined = if Path::new(raw).is_absolute() {
            PathBuf::from(raw)
        } else {
            self.sandbox_root.join(raw)
        };
        let normalized = normalize(&joined);

        // Lexical boundary check before touching the filesystem
        if !normalized.starts_with(&self.sandbox_root) {
            return Err(ToolError::PathViolation(format!("Path escapes sandbox: {}", raw)));
        }
        if normalized == self.sandbox_root {
            return Err(ToolError::PathViolation(format!("Path is the sandbox root: {}", raw)));
        }

        let mut existing = normalized.as_path();
        let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
        loop {
            if fs::symlink_metadata(existing).is_ok() {
                break;
            }
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name);
                    existing = parent;
                }
                _ => return Err(ToolError::PathViolation(format!("Unresolvable path: {}", raw))),
            }
        }

        // Dangling symlinks fail here rather than being written through.
        let canonical = fs::canonicalize(existing)
            .map_err(|_| ToolError::PathViolation(format!("Unresolvable path: {}", raw)))?;
        if !canonical.starts_with(&self.sandbox_root) {
            return Err(ToolError::PathViolation(format!("Symlink escapes sandbox: {}", raw)));
        }

        let resolved = tail.into_iter().rev().fold(canonical, |acc, part| acc.join(part));
        if resolved == self.sandbox_root {
            return Err(ToolError::PathViolation(format!("Path is the sandbox root: {}", raw)));
        }
        Ok(resolved)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
