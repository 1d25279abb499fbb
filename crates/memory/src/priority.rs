use monk_core::{Message, Role};
use serde::{Deserialize, Serialize};

/// Pluggable pruning weight. Lower weights are pruned first.
pub trait PriorityPolicy: Send + Sync {
    fn priority(&self, message: &Message) -> u32;
}

/// Weight by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePriorities {
    pub system: u32,
    pub user: u32,
    pub assistant: u32,
    pub tool: u32,
}

impl Default for RolePriorities {
    fn default() -> Self {
        Self {
            system: 5,
            user: 4,
            assistant: 3,
            tool: 5,
        }
    }
}

impl PriorityPolicy for RolePriorities {
    fn priority(&self, message: &Message) -> u32 {
        match message.role {
            Role::System => self.system,
            Role::User => self.user,
            Role::Assistant => self.assistant,
            Role::Tool => self.tool,
        }
    }
}
