use super::{normalize, Extraction, ExtractionStrategy, NAME_KEYS, PARAM_KEYS};
use crate::scanner::balanced_end;
use monk_core::{CallFields, Confidence, StrategyKind};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(?:action|tool)["']?\s*:\s*["']([A-Za-z_][A-Za-z0-9_.\-]*)["']"#)
        .expect("tool name pattern compiles")
});

static PARAMS_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["']?(?:parameters|args)["']?\s*:\s*"#).expect("parameter key pattern compiles")
});

static STRING_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z_][A-Za-z0-9_]*)"\s*:\s*"((?:[^"\\]|\\.)*)""#)
        .expect("string pair pattern compiles")
});

/// Strategy C: pull the known fields out of a span that is not valid JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldPatternStrategy;

impl ExtractionStrategy for FieldPatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FieldPattern
    }

    fn confidence(&self) -> Confidence {
        Confidence::Low
    }

    fn extract(&self, span: &str) -> Extraction {
        let Some(name) = NAME_RE.captures(span).and_then(|c| c.get(1)) else {
            return Extraction::NoMatch("no tool name field".into());
        };
        let name = name.as_str().to_string();

        let Some(key) = PARAMS_KEY_RE.find(span) else {
            return Extraction::Matched(CallFields::new(name, Map::new()));
        };
        let rest = &span[key.end()..];

        if let Some(end) = balanced_end(rest) {
            let object = &rest[..=end];
            if let Some(parameters) = parse_object(object) {
                return Extraction::Matched(CallFields::new(name, parameters));
            }
        }

        // Harvest flat string pairs from whatever follows the parameter key.
        let mut parameters = Map::new();
        for caps in STRING_PAIR_RE.captures_iter(rest) {
            let (Some(key), Some(raw)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let key = key.as_str();
            if NAME_KEYS.contains(&key) || PARAM_KEYS.contains(&key) {
                continue;
            }
            parameters.insert(key.to_string(), Value::String(unescape(raw.as_str())));
        }
        Extraction::Matched(CallFields::new(name, parameters))
    }
}

fn parse_object(object: &str) -> Option<Map<String, Value>> {
    let value = serde_json::from_str::<Value>(object)
        .or_else(|_| serde_json::from_str::<Value>(&normalize(object)))
        .ok()?;
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{}\"", raw)).unwrap_or_else(|_| raw.to_string())
}
