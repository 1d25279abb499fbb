use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    /// Resolved against the sandbox root before execution.
    Path,
    /// Checked against the command deny-list before execution.
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyClass {
    Safe,
    NeedsConfirmation,
    Blocked,
}

/// Static description of a tool: name, parameter schema and safety class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub safety: SafetyClass,
    /// File-mutating tools hold the sandbox root lock while running.
    #[serde(default)]
    pub mutates_files: bool,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, safety: SafetyClass) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            safety,
            mutates_files: false,
        }
    }

    pub fn required(mut self, name: &str, ty: ParamType, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty,
            required: true,
            description: description.to_string(),
        });
        self
    }

    pub fn optional(mut self, name: &str, ty: ParamType, description: &str) -> Self {
        self.params.push(ParamSpec {
            name: name.to_string(),
            ty,
            required: false,
            description: description.to_string(),
        });
        self
    }

    pub fn mutating(mut self) -> Self {
        self.mutates_files = true;
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// JSON-schema-like rendering for the model prompt.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let ty = match param.ty {
                ParamType::Integer => "integer",
                ParamType::Boolean => "boolean",
                _ => "string",
            };
            properties.insert(
                param.name.clone(),
                json!({"type": ty, "description": param.description}),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }
}
