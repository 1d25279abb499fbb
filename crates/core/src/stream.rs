//! Pull-based chunk stream with an explicit end-of-stream signal.

use crate::error::ProviderError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// One step of a streamed model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    End,
}

/// A streamed model response.
///
/// Callers hold at most one outstanding `next_event` at a time; events are
/// delivered in arrival order and nothing follows `End`.
#[async_trait]
pub trait ChunkStream: Send {
    async fn next_event(&mut self) -> Result<StreamEvent, ProviderError>;
}

/// Chunk stream fed by a task through a channel.
pub struct ChannelChunkStream {
    rx: mpsc::Receiver<Result<StreamEvent, ProviderError>>,
    ended: bool,
}

impl ChannelChunkStream {
    pub fn new(rx: mpsc::Receiver<Result<StreamEvent, ProviderError>>) -> Self {
        Self { rx, ended: false }
    }

    /// Build a bounded channel and its consuming stream.
    pub fn channel(capacity: usize) -> (mpsc::Sender<Result<StreamEvent, ProviderError>>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl ChunkStream for ChannelChunkStream {
    async fn next_event(&mut self) -> Result<StreamEvent, ProviderError> {
        if self.ended {
            return Ok(StreamEvent::End);
        }
        match self.rx.recv().await {
            Some(Ok(StreamEvent::End)) => {
                self.ended = true;
                Ok(StreamEvent::End)
            }
            Some(event) => event,
            None => {
                tracing::warn!("Chunk channel closed before end-of-stream");
                Err(ProviderError::Truncated)
            }
        }
    }
}

/// In-memory stream over a fixed list of chunks, followed by `End`.
pub struct VecChunkStream {
    chunks: std::collections::VecDeque<String>,
}

impl VecChunkStream {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ChunkStream for VecChunkStream {
    async fn next_event(&mut self) -> Result<StreamEvent, ProviderError> {
        Ok(match self.chunks.pop_front() {
            Some(chunk) => StreamEvent::Chunk(chunk),
            None => StreamEvent::End,
        })
    }
}
