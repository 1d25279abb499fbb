use crate::error::ContextError;
use monk_core::{Message, ToolLogEntry};
use serde::{Deserialize, Serialize};

/// Ordered conversation plus its token accounting.
///
/// This is also the snapshot format: it serializes verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,
    /// Always the sum of `token_count` over `messages`.
    pub token_count: usize,
    pub budget_ceiling: usize,
    /// Pruning triggers above this many tokens.
    pub watermark: usize,
    pub next_position: u64,
    #[serde(default)]
    pub tool_log: Vec<ToolLogEntry>,
}

impl ConversationState {
    pub fn new(budget_ceiling: usize, watermark: usize) -> Self {
        Self {
            messages: Vec::new(),
            token_count: 0,
            budget_ceiling,
            watermark,
            next_position: 0,
            tool_log: Vec::new(),
        }
    }

    /// Check the invariants a restored snapshot must satisfy.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.budget_ceiling == 0 {
            return Err(ContextError::InvalidSnapshot("budget ceiling is zero".into()));
        }
        if self.watermark > self.budget_ceiling {
            return Err(ContextError::InvalidSnapshot(format!(
                "watermark {} exceeds budget ceiling {}",
                self.watermark, self.budget_ceiling
            )));
        }

        let sum: usize = self.messages.iter().map(|m| m.token_count).sum();
        if sum != self.token_count {
            return Err(ContextError::InvalidSnapshot(format!(
                "token count {} does not match message sum {}",
                self.token_count, sum
            )));
        }

        let ordered = self
            .messages
            .windows(2)
            .all(|pair| pair[0].position < pair[1].position);
        if !ordered {
            return Err(ContextError::InvalidSnapshot(
                "message positions are duplicated or out of order".into(),
            ));
        }
        if let Some(last) = self.messages.last() {
            if last.position >= self.next_position {
                return Err(ContextError::InvalidSnapshot(format!(
                    "next position {} is not after last message position {}",
                    self.next_position, last.position
                )));
            }
        }
        Ok(())
    }
}
