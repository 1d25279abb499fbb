use super::{fields_from_value, Extraction, ExtractionStrategy};
use monk_core::{Confidence, StrategyKind};

/// Strategy A: the span parses as JSON as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictStrategy;

impl ExtractionStrategy for StrictStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Strict
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn extract(&self, span: &str) -> Extraction {
        match serde_json::from_str::<serde_json::Value>(span) {
            Ok(value) => fields_from_value(&value),
            Err(e) => Extraction::NoMatch(format!("json: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_parse() {
        let span = r#"{"action":"show_file","parameters":{"filepath":"a.py"}}"#;
        assert!(matches!(StrictStrategy.extract(span), Extraction::Matched(f) if f.name == "show_file"));
    }

    #[test]
    fn test_trailing_comma_is_no_match() {
        let span = r#"{"action":"show_file",}"#;
        assert!(matches!(StrictStrategy.extract(span), Extraction::NoMatch(_)));
    }
}
