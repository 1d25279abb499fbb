use thiserror::Error;

/// Failures raised by a model provider stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Stream closed before end-of-stream marker")]
    Truncated,

    #[error("Request rejected: {0}")]
    Rejected(String),
}
