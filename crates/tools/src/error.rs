use monk_core::ErrorKind;
use thiserror::Error;

/// Failure raised while executing a tool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Path violation: {0}")]
    PathViolation(String),

    #[error("Safety blocked: {0}")]
    SafetyBlocked(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Range error: {0}")]
    RangeError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation timed out")]
    Timeout,

    #[error("Internal error")]
    Internal,
}

impl ToolError {
    /// Wire-level kind reported to the model.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::ValidationError(_) => ErrorKind::ValidationError,
            ToolError::PathViolation(_) => ErrorKind::PathViolation,
            ToolError::SafetyBlocked(_) => ErrorKind::SafetyBlocked,
            ToolError::ExecutionFailed(_) | ToolError::Internal => ErrorKind::ExecutionError,
            ToolError::RangeError(_) => ErrorKind::RangeError,
            ToolError::NotFound(_) => ErrorKind::NotFound,
            ToolError::Timeout => ErrorKind::Timeout,
        }
    }

    pub(crate) fn io(context: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound(context.to_string()),
            _ => ToolError::ExecutionFailed(format!("{}: {}", context, err)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),
}

/// Rejection of a tool-call candidate. No invocation is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Tool call could not be parsed")]
    Unparsed,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters for {tool}: missing {missing_fields:?}, invalid {invalid_fields:?}")]
    InvalidParameters {
        tool: String,
        missing_fields: Vec<String>,
        invalid_fields: Vec<String>,
    },
}

impl ValidationError {
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ValidationError::InvalidParameters { missing_fields, .. } => missing_fields,
            _ => &[],
        }
    }

    pub fn invalid_fields(&self) -> &[String] {
        match self {
            ValidationError::InvalidParameters { invalid_fields, .. } => invalid_fields,
            _ => &[],
        }
    }
}
