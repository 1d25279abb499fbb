use crate::descriptor::{ParamType, SafetyClass};
use monk_core::Confidence;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A parameter value coerced to its declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Path(String),
    Command(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) | ParamValue::Path(s) | ParamValue::Command(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn param_type(&self) -> ParamType {
        match self {
            ParamValue::String(_) => ParamType::String,
            ParamValue::Integer(_) => ParamType::Integer,
            ParamValue::Boolean(_) => ParamType::Boolean,
            ParamValue::Path(_) => ParamType::Path,
            ParamValue::Command(_) => ParamType::Command,
        }
    }
}

/// A validated tool call. Only the validator constructs these.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    id: String,
    name: String,
    params: BTreeMap<String, ParamValue>,
    extra: Map<String, Value>,
    safety: SafetyClass,
    mutates_files: bool,
    confidence: Confidence,
}

impl ToolInvocation {
    pub(crate) fn new(
        name: String,
        params: BTreeMap<String, ParamValue>,
        extra: Map<String, Value>,
        safety: SafetyClass,
        mutates_files: bool,
        confidence: Confidence,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            params,
            extra,
            safety,
            mutates_files,
            confidence,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn safety(&self) -> SafetyClass {
        self.safety
    }

    pub fn mutates_files(&self) -> bool {
        self.mutates_files
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn params(&self) -> &BTreeMap<String, ParamValue> {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    /// Parameters the descriptor does not declare. Kept, never executed on.
    pub fn extra_params(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn path_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().filter_map(|(name, value)| match value {
            ParamValue::Path(p) => Some((name.as_str(), p.as_str())),
            _ => None,
        })
    }

    pub fn command_params(&self) -> impl Iterator<Item = &str> {
        self.params.values().filter_map(|value| match value {
            ParamValue::Command(c) => Some(c.as_str()),
            _ => None,
        })
    }

    /// One-line summary for confirmation prompts.
    pub fn describe(&self) -> String {
        let args: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    ParamValue::Integer(n) => n.to_string(),
                    ParamValue::Boolean(b) => b.to_string(),
                    ParamValue::String(s) | ParamValue::Path(s) | ParamValue::Command(s) => {
                        preview(s, 80)
                    }
                };
                format!("{}={}", k, shown)
            })
            .collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push('…');
    }
    format!("{:?}", out)
}
