use crate::descriptor::ToolDescriptor;
use crate::error::RegistryError;
use crate::traits::Tool;
use std::collections::HashMap;
use std::sync::Arc;

/// Static name → tool mapping, populated once at startup.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<&mut Self, RegistryError> {
        let name = tool.descriptor().name.clone();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|tool| tool.descriptor())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool names in registration order.
    pub fn list(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.lookup(name))
            .collect()
    }

    pub fn schemas(&self) -> Vec<serde_json::Value> {
        self.descriptors().iter().map(|d| d.schema()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
