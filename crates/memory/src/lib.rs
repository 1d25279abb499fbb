//! Conversation context: token accounting, priority pruning and snapshots.

pub mod context_manager;
pub mod error;
pub mod estimator;
pub mod priority;
pub mod session_store;
pub mod state;

pub use context_manager::{ContextConfig, ContextManager, PruneReport};
pub use error::ContextError;
pub use estimator::{CharRatioEstimator, TokenEstimator};
pub use priority::{PriorityPolicy, RolePriorities};
pub use session_store::{FileSessionStore, SessionStore};
pub use state::ConversationState;
