use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    /// Pruning exhausted the eligible set and the total is still too high.
    #[error("Context overflow: {token_count} tokens exceeds watermark of {watermark}")]
    Overflow { token_count: usize, watermark: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
