//! Ordered extraction strategies, first match wins.

mod field_pattern;
mod intent;
mod normalized;
mod strict;

pub use field_pattern::FieldPatternStrategy;
pub use intent::{IntentMatcher, IntentRule};
pub use normalized::{normalize, NormalizedStrategy};
pub use strict::StrictStrategy;

use monk_core::{CallFields, Confidence, StrategyKind};
use serde_json::{Map, Value};

/// Field names accepted for the tool name.
pub const NAME_KEYS: &[&str] = &["action", "tool"];
/// Field names accepted for the parameter object.
pub const PARAM_KEYS: &[&str] = &["parameters", "args"];

/// Result of running one strategy over a span.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Matched(CallFields),
    NoMatch(String),
}

/// A pure function from a balanced span to a tool-call mapping.
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn confidence(&self) -> Confidence;

    fn extract(&self, span: &str) -> Extraction;
}

/// Build the default strategy list.
pub fn default_strategies(enable_intent_inference: bool) -> Vec<Box<dyn ExtractionStrategy>> {
    let mut strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
        Box::new(StrictStrategy),
        Box::new(NormalizedStrategy),
        Box::new(FieldPatternStrategy),
    ];
    if enable_intent_inference {
        strategies.push(Box::new(IntentMatcher::with_default_rules()));
    }
    strategies
}

/// Interpret a parsed value as a tool call.
pub(crate) fn fields_from_value(value: &Value) -> Extraction {
    let Some(object) = value.as_object() else {
        return Extraction::NoMatch("not an object".into());
    };

    let name = NAME_KEYS.iter().find_map(|key| object.get(*key));
    let name = match name {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(_) => return Extraction::NoMatch("tool name is not a non-empty string".into()),
        None => return Extraction::NoMatch("no action or tool field".into()),
    };

    let parameters = match PARAM_KEYS.iter().find_map(|key| object.get(*key)) {
        Some(Value::Object(params)) => params.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Extraction::NoMatch("parameters is not an object".into()),
    };

    Extraction::Matched(CallFields::new(name, parameters))
}
