//! Runtime errors and the collaborators the agent loop consumes.

use async_trait::async_trait;
use monk_core::{ChunkStream, Message, ProviderError, ToolCallCandidate, ToolResult};
use monk_memory::ContextError;
use monk_tools::{RegistryError, ToolError};
use thiserror::Error;

/// Runtime errors.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Everything the provider needs to produce the next response.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tool_schemas: Vec<serde_json::Value>,
}

/// Model provider client.
///
/// Returns a stream of text chunks ending in an explicit
/// [`StreamEvent::End`](monk_core::StreamEvent::End).
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn stream(&self, request: &ModelRequest) -> Result<Box<dyn ChunkStream>, ProviderError>;
}

/// Something the loop shows the user as it happens.
#[derive(Debug, Clone, Copy)]
pub enum DisplayEvent<'a> {
    Text(&'a str),
    ToolCall(&'a ToolCallCandidate),
    ToolResult(&'a ToolResult),
}

/// Side-effect-only output channel.
pub trait DisplaySink: Send + Sync {
    fn display(&self, event: DisplayEvent<'_>);
}

/// Discards everything.
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn display(&self, _event: DisplayEvent<'_>) {}
}
