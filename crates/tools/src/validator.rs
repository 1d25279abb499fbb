use crate::descriptor::ParamType;
use crate::error::ValidationError;
use crate::invocation::{ParamValue, ToolInvocation};
use crate::registry::ToolRegistry;
use monk_core::ToolCallCandidate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Checks candidates against the registry. No I/O, no mutation.
#[derive(Clone)]
pub struct Validator {
    registry: Arc<ToolRegistry>,
}

impl Validator {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn validate(&self, candidate: &ToolCallCandidate) -> Result<ToolInvocation, ValidationError> {
        let fields = candidate.fields.as_ref().ok_or(ValidationError::Unparsed)?;
        let descriptor = self
            .registry
            .lookup(&fields.name)
            .ok_or_else(|| ValidationError::UnknownTool(fields.name.clone()))?;

        let mut missing_fields = Vec::new();
        let mut invalid_fields = Vec::new();
        let mut params = BTreeMap::new();

        for spec in &descriptor.params {
            match fields.parameters.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        missing_fields.push(spec.name.clone());
                    }
                }
                Some(value) => match coerce(value, spec.ty) {
                    Some(coerced) => {
                        params.insert(spec.name.clone(), coerced);
                    }
                    None => invalid_fields.push(spec.name.clone()),
                },
            }
        }

        if !missing_fields.is_empty() || !invalid_fields.is_empty() {
            return Err(ValidationError::InvalidParameters {
                tool: descriptor.name.clone(),
                missing_fields,
                invalid_fields,
            });
        }

        let extra: Map<String, Value> = fields
            .parameters
            .iter()
            .filter(|(key, _)| descriptor.param(key).is_none())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if !extra.is_empty() {
            debug!(
                "Tool {} received undeclared parameters: {:?}",
                descriptor.name,
                extra.keys().collect::<Vec<_>>()
            );
        }

        Ok(ToolInvocation::new(
            descriptor.name.clone(),
            params,
            extra,
            descriptor.safety,
            descriptor.mutates_files,
            candidate.confidence,
        ))
    }
}

fn coerce(value: &Value, ty: ParamType) -> Option<ParamValue> {
    match ty {
        ParamType::String => match value {
            Value::String(s) => Some(ParamValue::String(s.clone())),
            Value::Number(n) => Some(ParamValue::String(n.to_string())),
            Value::Bool(b) => Some(ParamValue::String(b.to_string())),
            _ => None,
        },
        ParamType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64))
                .map(ParamValue::Integer),
            Value::String(s) => s.trim().parse::<i64>().ok().map(ParamValue::Integer),
            _ => None,
        },
        ParamType::Boolean => match value {
            Value::Bool(b) => Some(ParamValue::Boolean(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(ParamValue::Boolean(true)),
                "false" | "no" | "0" => Some(ParamValue::Boolean(false)),
                _ => None,
            },
            _ => None,
        },
        ParamType::Path => match value {
            Value::String(s) if !s.trim().is_empty() && !s.contains('\0') => {
                Some(ParamValue::Path(s.trim().to_string()))
            }
            _ => None,
        },
        ParamType::Command => match value {
            Value::String(s) if !s.trim().is_empty() => Some(ParamValue::Command(s.clone())),
            Value::Array(parts) if !parts.is_empty() => parts
                .iter()
                .map(|p| p.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(|parts| ParamValue::Command(parts.join(" "))),
            _ => None,
        },
    }
}
