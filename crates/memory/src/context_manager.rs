//! Token-bounded conversation store with priority pruning.

use crate::error::ContextError;
use crate::estimator::{CharRatioEstimator, TokenEstimator};
use crate::priority::{PriorityPolicy, RolePriorities};
use crate::state::ConversationState;
use monk_core::{Message, Role, ToolLogEntry, ToolResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Context manager settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Model context window, in tokens. This is the budget ceiling.
    pub context_window: usize,
    /// Fraction of the window above which pruning runs.
    pub prune_threshold: f64,
    /// Most recent exchanges that are never pruned.
    pub keep_recent_exchanges: usize,
    pub chars_per_token: f64,
    pub message_overhead: usize,
    pub priorities: RolePriorities,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            context_window: 128_000,
            prune_threshold: 0.9,
            keep_recent_exchanges: 3,
            chars_per_token: 4.0,
            message_overhead: 4,
            priorities: RolePriorities::default(),
        }
    }
}

impl ContextConfig {
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.context_window == 0 {
            return Err(ContextError::InvalidConfig("context_window must be > 0".into()));
        }
        if !(self.prune_threshold > 0.0 && self.prune_threshold <= 1.0) {
            return Err(ContextError::InvalidConfig(format!(
                "prune_threshold must be in (0, 1], got {}",
                self.prune_threshold
            )));
        }
        Ok(())
    }

    pub fn watermark(&self) -> usize {
        ((self.context_window as f64) * self.prune_threshold).floor() as usize
    }
}

/// Outcome of a pruning pass that reached the watermark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: usize,
    pub tokens_freed: usize,
}

pub struct ContextManager {
    state: ConversationState,
    estimator: Box<dyn TokenEstimator>,
    priorities: Box<dyn PriorityPolicy>,
    keep_recent_exchanges: usize,
}

impl ContextManager {
    pub fn new(config: &ContextConfig) -> Result<Self, ContextError> {
        Self::with_policies(
            config,
            Box::new(CharRatioEstimator::new(config.chars_per_token, config.message_overhead)),
            Box::new(config.priorities),
        )
    }

    pub fn with_policies(
        config: &ContextConfig,
        estimator: Box<dyn TokenEstimator>,
        priorities: Box<dyn PriorityPolicy>,
    ) -> Result<Self, ContextError> {
        config.validate()?;
        Ok(Self {
            state: ConversationState::new(config.context_window, config.watermark()),
            estimator,
            priorities,
            keep_recent_exchanges: config.keep_recent_exchanges,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    pub fn token_count(&self) -> usize {
        self.state.token_count
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn tool_log(&self) -> &[ToolLogEntry] {
        &self.state.tool_log
    }

    pub fn needs_pruning(&self) -> bool {
        self.state.token_count > self.state.watermark
    }

    /// Estimate, position and store `message`.
    pub fn append(&mut self, mut message: Message) -> &Message {
        message.token_count = self.estimator.estimate(&message);
        message.priority = self.priorities.priority(&message);
        message.position = self.state.next_position;
        self.state.next_position += 1;
        self.state.token_count += message.token_count;
        debug!(
            "Appended {} message ({} tokens, total {})",
            message.role.as_str(),
            message.token_count,
            self.state.token_count
        );
        self.state.messages.push(message);
        &self.state.messages[self.state.messages.len() - 1]
    }

    pub fn record_tool(&mut self, result: &ToolResult) {
        self.state.tool_log.push(ToolLogEntry::from_result(result));
    }

    /// Prune lowest-weight eligible messages until at or under the watermark.
    ///
    /// System messages and the most recent exchanges are never eligible.
    pub fn prune_if_needed(&mut self) -> Result<PruneReport, ContextError> {
        if !self.needs_pruning() {
            return Ok(PruneReport::default());
        }

        let protect_from = self.protected_start();
        let mut eligible: Vec<usize> = (0..protect_from)
            .filter(|&i| self.state.messages[i].role != Role::System)
            .collect();
        eligible.sort_by_key(|&i| {
            let m = &self.state.messages[i];
            (m.priority, m.position)
        });

        let mut doomed = HashSet::new();
        let mut report = PruneReport::default();
        let mut total = self.state.token_count;
        for index in eligible {
            if total <= self.state.watermark {
                break;
            }
            let tokens = self.state.messages[index].token_count;
            total -= tokens;
            report.removed += 1;
            report.tokens_freed += tokens;
            doomed.insert(index);
        }

        let mut index = 0;
        self.state.messages.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        self.state.token_count = total;

        info!(
            "Pruned {} messages ({} tokens); total now {}/{}",
            report.removed, report.tokens_freed, total, self.state.watermark
        );

        if self.needs_pruning() {
            warn!(
                "Context still over watermark after pruning: {} > {}",
                self.state.token_count, self.state.watermark
            );
            return Err(ContextError::Overflow {
                token_count: self.state.token_count,
                watermark: self.state.watermark,
            });
        }
        Ok(report)
    }

    /// Drop the oldest non-system message, ignoring exchange protection.
    pub fn force_drop_oldest(&mut self) -> Option<Message> {
        let index = self
            .state
            .messages
            .iter()
            .position(|m| m.role != Role::System)?;
        let message = self.state.messages.remove(index);
        self.state.token_count -= message.token_count;
        warn!(
            "Force-dropped {} message at position {} ({} tokens)",
            message.role.as_str(),
            message.position,
            message.token_count
        );
        Some(message)
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.clone()
    }

    /// Replace the current state. Invalid snapshots are rejected unchanged.
    pub fn restore(&mut self, snapshot: ConversationState) -> Result<(), ContextError> {
        snapshot.validate()?;
        self.state = snapshot;
        Ok(())
    }

    /// Index of the first message in the protected recent exchanges.
    fn protected_start(&self) -> usize {
        if self.keep_recent_exchanges == 0 {
            return self.state.messages.len();
        }
        let mut seen = 0;
        for (index, message) in self.state.messages.iter().enumerate().rev() {
            if matches!(message.role, Role::User | Role::Assistant) {
                seen += 1;
                if seen == self.keep_recent_exchanges {
                    return index;
                }
            }
        }
        0
    }
}
