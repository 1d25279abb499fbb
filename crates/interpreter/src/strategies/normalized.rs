use super::{fields_from_value, Extraction, ExtractionStrategy};
use monk_core::{Confidence, StrategyKind};

/// Strategy B: repair common model malformations, then parse strictly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedStrategy;

impl ExtractionStrategy for NormalizedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Normalized
    }

    fn confidence(&self) -> Confidence {
        Confidence::High
    }

    fn extract(&self, span: &str) -> Extraction {
        let repaired = normalize(span);
        match serde_json::from_str::<serde_json::Value>(&repaired) {
            Ok(value) => fields_from_value(&value),
            Err(e) => Extraction::NoMatch(format!("json after normalization: {}", e)),
        }
    }
}

/// Rewrite smart quotes to ASCII, escape raw control characters inside
/// string literals and drop trailing commas before `}` or `]`.
pub fn normalize(span: &str) -> String {
    let chars: Vec<char> = span
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(span.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_commas_removed() {
        assert_eq!(normalize(r#"{"a":[1,2,],}"#), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_comma_inside_string_kept() {
        assert_eq!(normalize(r#"{"a":"x,}"}"#), r#"{"a":"x,}"}"#);
    }

    #[test]
    fn test_smart_quotes() {
        let span = "{\u{201C}action\u{201D}: \u{201C}finish\u{201D}}";
        assert_eq!(normalize(span), r#"{"action": "finish"}"#);
    }

    #[test]
    fn test_raw_newline_in_string_escaped() {
        let span = "{\"action\":\"create_file\",\"parameters\":{\"content\":\"a\nb\"}}";
        let fixed = normalize(span);
        assert!(fixed.contains(r#""a\nb""#));
        assert!(matches!(
            NormalizedStrategy.extract(span),
            Extraction::Matched(f) if f.parameters["content"] == "a\nb"
        ));
    }

    #[test]
    fn test_newline_between_tokens_kept() {
        assert_eq!(normalize("{\n\"a\": 1\n}"), "{\n\"a\": 1\n}");
    }
}
