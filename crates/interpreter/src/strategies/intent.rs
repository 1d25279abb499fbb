use super::{Extraction, ExtractionStrategy};
use monk_core::{CallFields, Confidence, StrategyKind};
use regex::Regex;
use serde_json::{Map, Value};

/// One imperative phrasing mapped onto a tool and a single parameter.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pattern: Regex,
    tool: String,
    parameter: String,
}

impl IntentRule {
    /// The pattern's first capture group becomes the parameter value.
    pub fn new(
        pattern: &str,
        tool: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            tool: tool.into(),
            parameter: parameter.into(),
        })
    }

    fn apply(&self, text: &str) -> Option<CallFields> {
        let value = self.pattern.captures(text)?.get(1)?.as_str().trim();
        if value.is_empty() {
            return None;
        }
        let mut parameters = Map::new();
        parameters.insert(self.parameter.clone(), Value::String(value.to_string()));
        Some(CallFields::new(self.tool.clone(), parameters))
    }
}

/// Strategy D: natural-language intent inference. Always low confidence.
#[derive(Debug, Clone, Default)]
pub struct IntentMatcher {
    rules: Vec<IntentRule>,
}

const DEFAULT_RULES: &[(&str, &str, &str)] = &[
    (
        r#"(?i)^(?:please\s+)?(?:read|show|open|display|cat)\s+(?:the\s+)?(?:file\s+)?[`'"]?([\w./\-]+)[`'"]?\.?$"#,
        "show_file",
        "filepath",
    ),
    (
        r#"(?i)^(?:please\s+)?(?:run|execute)\s+(?:the\s+)?(?:command\s+)?[`'"]?(.+?)[`'"]?$"#,
        "execute_command",
        "command",
    ),
];

impl IntentMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_rules() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .filter_map(|(pattern, tool, param)| IntentRule::new(pattern, *tool, *param).ok())
            .collect();
        Self { rules }
    }

    pub fn add_rule(&mut self, rule: IntentRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl ExtractionStrategy for IntentMatcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::IntentInference
    }

    fn confidence(&self) -> Confidence {
        Confidence::Low
    }

    fn extract(&self, span: &str) -> Extraction {
        let inner = span
            .trim()
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim();
        self.rules
            .iter()
            .find_map(|rule| rule.apply(inner))
            .map(Extraction::Matched)
            .unwrap_or_else(|| Extraction::NoMatch("no intent rule matched".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(IntentMatcher::with_default_rules().rule_count(), DEFAULT_RULES.len());
    }

    #[test]
    fn test_show_file_phrase() {
        let matcher = IntentMatcher::with_default_rules();
        match matcher.extract("{please open the file `src/lib.rs`}") {
            Extraction::Matched(fields) => {
                assert_eq!(fields.name, "show_file");
                assert_eq!(fields.parameters["filepath"], "src/lib.rs");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_run_phrase() {
        let matcher = IntentMatcher::with_default_rules();
        match matcher.extract("{run cargo fmt --all}") {
            Extraction::Matched(fields) => {
                assert_eq!(fields.name, "execute_command");
                assert_eq!(fields.parameters["command"], "cargo fmt --all");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_rule_and_no_match() {
        let mut matcher = IntentMatcher::new();
        assert!(matches!(matcher.extract("{show a.py}"), Extraction::NoMatch(_)));

        matcher.add_rule(IntentRule::new(r"^finish\s*(.*)$", "finish", "summary").unwrap());
        assert!(matches!(
            matcher.extract("{finish all done}"),
            Extraction::Matched(f) if f.name == "finish" && f.parameters["summary"] == "all done"
        ));
    }
}
