//! Core data model shared by the monk agent crates.

pub mod error;
pub mod stream;
pub mod types;

pub use error::ProviderError;
pub use stream::{ChannelChunkStream, ChunkStream, StreamEvent, VecChunkStream};
pub use types::{
    CallFields, Confidence, ErrorKind, Message, Observation, Role, StrategyKind, ToolCallCandidate,
    ToolLogEntry, ToolResult, ToolStatus,
};
