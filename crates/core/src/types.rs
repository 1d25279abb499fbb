//! Shared data model for the interpreter, tools, memory and runtime crates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message role in conversation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single message in the conversation.
///
/// `token_count`, `position` and `priority` are assigned by the context
/// manager when the message is appended; after that the message is never
/// mutated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub token_count: usize,
    #[serde(default)]
    pub position: u64,
    #[serde(default)]
    pub priority: u32,
}

impl Message {
    /// Create a new, not yet appended message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            token_count: 0,
            position: 0,
            priority: 0,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }
}

/// Which interpreter strategy produced a tool-call mapping.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Strict structured parse of the balanced span.
    Strict,
    /// Strict parse after repairing common malformations.
    Normalized,
    /// Independent pattern match of the known field names.
    FieldPattern,
    /// Imperative natural-language phrasing.
    IntentInference,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

/// Tool name and raw parameter mapping recovered from a span.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallFields {
    pub name: String,
    pub parameters: Map<String, Value>,
}

impl CallFields {
    pub fn new(name: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// A tool call recognised in a model response, not yet validated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolCallCandidate {
    /// Raw source span exactly as streamed.
    pub span: String,
    pub fields: Option<CallFields>,
    pub strategy: StrategyKind,
    pub confidence: Confidence,
}

impl ToolCallCandidate {
    pub fn name(&self) -> Option<&str> {
        self.fields.as_ref().map(|f| f.name.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Failure,
    Denied,
}

/// Error kinds surfaced to the model inside observations.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    PathViolation,
    SafetyBlocked,
    ExecutionError,
    RangeError,
    NotFound,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::PathViolation => "path_violation",
            ErrorKind::SafetyBlocked => "safety_blocked",
            ErrorKind::ExecutionError => "execution_error",
            ErrorKind::RangeError => "range_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Timeout => "timeout",
        }
    }
}

/// Outcome of one tool invocation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolResult {
    pub invocation_id: String,
    pub tool: String,
    pub status: ToolStatus,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Set by the `finish` tool; the loop terminates after this turn.
    #[serde(default)]
    pub finish: bool,
}

impl ToolResult {
    pub fn success(invocation_id: impl Into<String>, tool: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool: tool.into(),
            status: ToolStatus::Success,
            output: output.into(),
            error_kind: None,
            finish: false,
        }
    }

    pub fn failure(
        invocation_id: impl Into<String>,
        tool: impl Into<String>,
        kind: ErrorKind,
        output: impl Into<String>,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool: tool.into(),
            status: ToolStatus::Failure,
            output: output.into(),
            error_kind: Some(kind),
            finish: false,
        }
    }

    pub fn denied(
        invocation_id: impl Into<String>,
        tool: impl Into<String>,
        kind: Option<ErrorKind>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            tool: tool.into(),
            status: ToolStatus::Denied,
            output: output.into(),
            error_kind: kind,
            finish: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }

    pub fn is_safety_blocked(&self) -> bool {
        self.error_kind == Some(ErrorKind::SafetyBlocked)
    }

    /// Model-facing observation payload.
    pub fn observation(&self) -> Observation<'_> {
        Observation {
            tool: &self.tool,
            status: self.status,
            output: &self.output,
            error_kind: self.error_kind,
        }
    }
}

/// Wire shape of a tool result fed back to the model.
#[derive(Debug, Serialize, Clone, Copy)]
pub struct Observation<'a> {
    pub tool: &'a str,
    pub status: ToolStatus,
    pub output: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl Observation<'_> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                "{{\"tool\":{:?},\"status\":\"failure\",\"output\":\"unserializable output\"}}",
                self.tool
            )
        })
    }
}

/// One line of the persisted tool invocation log.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ToolLogEntry {
    pub invocation_id: String,
    pub tool: String,
    pub status: ToolStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub timestamp: i64,
}

impl ToolLogEntry {
    pub fn from_result(result: &ToolResult) -> Self {
        Self {
            invocation_id: result.invocation_id.clone(),
            tool: result.tool.clone(),
            status: result.status,
            error_kind: result.error_kind,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
