//! Recovery of structured JSON from free-form model output
//!
//! Models wrap JSON in markdown fences, use typographic quotes, leave trailing
//! commas or prepend chatter. [`parse_structured`] tries progressively more
//! aggressive repairs and returns the first candidate that parses.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{Result, TravelAiError};

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[ \t]*(?:json|JSON)?").expect("valid fence pattern"));
static SINGLE_QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<pre>[\[{:,]\s*)'(?P<body>[^'"\n]*)'"#).expect("valid quote pattern")
});
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*(?P<close>[}\]])").expect("valid comma pattern"));
static UNQUOTED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pre>[{,]\s*)(?P<key>[A-Za-z_][A-Za-z0-9_]*)\s*:").expect("valid key pattern")
});
static HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\x(?P<hex>[0-9a-fA-F]{2})").expect("valid escape pattern"));
static GREEDY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object pattern"));
static LAZY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*?\}").expect("valid object pattern"));

/// Parse model output into JSON, repairing common damage along the way
pub fn parse_structured(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(text.trim()) {
        return Ok(value);
    }

    let unfenced = FENCE.replace_all(text, "");
    let unfenced = unfenced.trim();
    if let Ok(value) = serde_json::from_str(unfenced) {
        debug!("Recovered JSON after removing code fences");
        return Ok(value);
    }

    let repaired = repair_syntax(unfenced);
    if let Ok(value) = serde_json::from_str(&repaired) {
        debug!("Recovered JSON after syntax repair");
        return Ok(value);
    }

    for pattern in [&*GREEDY_OBJECT, &*LAZY_OBJECT] {
        if let Some(found) = pattern.find(&repaired)
            && let Ok(value) = serde_json::from_str(found.as_str())
        {
            debug!("Recovered JSON from embedded object");
            return Ok(value);
        }
    }

    let balanced = balanced_lines(&repaired);
    serde_json::from_str(&balanced).map_err(|err| {
        let attempted = if balanced.is_empty() { &repaired } else { &balanced };
        TravelAiError::parse(format!("No parseable JSON in response: {err}"), attempted)
    })
}

/// Parse model output straight into a typed value
pub fn parse_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = parse_structured(text)?;
    serde_json::from_value(value).map_err(|err| {
        TravelAiError::parse(format!("Unexpected response shape: {err}"), text)
    })
}

fn repair_syntax(text: &str) -> String {
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    let text = SINGLE_QUOTED.replace_all(&text, "$pre\"$body\"");
    let text = TRAILING_COMMA.replace_all(&text, "$close");
    let text = UNQUOTED_KEY.replace_all(&text, "$pre\"$key\":");
    HEX_ESCAPE.replace_all(&text, "\\u00$hex").into_owned()
}

/// Lines from the first `{` until the braces balance again
fn balanced_lines(text: &str) -> String {
    let mut depth = 0i64;
    let mut lines = Vec::new();
    for line in text
        .lines()
        .map(str::trim)
        .skip_while(|line| !line.contains('{'))
        .filter(|line| !line.is_empty())
    {
        depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;
        lines.push(line);
        if depth <= 0 {
            break;
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(r#"{"a": 1, "b": [1, 2]}"#)]
    #[case(r#"[{"a": 1}, {"a": 2}]"#)]
    fn test_valid_json_parses_directly(#[case] input: &str) {
        let expected: Value = serde_json::from_str(input).unwrap();
        assert_eq!(parse_structured(input).unwrap(), expected);
    }

    #[test]
    fn test_fenced_json_equals_inner() {
        let inner = r#"{"trip_name": "Pink City", "days": 3}"#;
        let fenced = format!("Here you go:\n```json\n{inner}\n```");
        assert_eq!(
            parse_structured(&fenced).unwrap(),
            serde_json::from_str::<Value>(inner).unwrap()
        );
    }

    #[rstest]
    #[case::trailing_comma(r#"{"a": [1, 2,], "b": 3,}"#, json!({"a": [1, 2], "b": 3}))]
    #[case::unquoted_keys(r#"{a: 1, b_c: "x"}"#, json!({"a": 1, "b_c": "x"}))]
    #[case::single_quotes("{'name': 'Hawa Mahal'}", json!({"name": "Hawa Mahal"}))]
    #[case::smart_quotes("{\u{201C}name\u{201D}: \u{201C}Amer\u{201D}}", json!({"name": "Amer"}))]
    #[case::hex_escape(r#"{"name": "caf\xe9"}"#, json!({"name": "café"}))]
    fn test_syntax_repairs(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(parse_structured(input).unwrap(), expected);
    }

    #[test]
    fn test_object_embedded_in_prose() {
        let input = "Sure! The plan is {\"days\": 2} and that is all.";
        assert_eq!(parse_structured(input).unwrap(), json!({"days": 2}));
    }

    #[test]
    fn test_balanced_lines_stop_at_closing_brace() {
        let text = "intro\n{\n\"a\": {\"b\": 1}\n}\ntrailing }";
        assert_eq!(balanced_lines(text), "{\n\"a\": {\"b\": 1}\n}");
    }

    #[test]
    fn test_stray_braces_recovered_by_line_scan() {
        // Greedy match swallows the stray brace, lazy match stops inside the nested object
        let input = "{\n\"a\": {\"b\": 1}\n}\n} trailing {";
        for pattern in [&*GREEDY_OBJECT, &*LAZY_OBJECT] {
            let found = pattern.find(input).unwrap();
            assert!(serde_json::from_str::<Value>(found.as_str()).is_err());
        }
        assert_eq!(parse_structured(input).unwrap(), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_unrecoverable_text_is_parse_error() {
        let err = parse_structured("no structure here at all").unwrap_err();
        assert!(matches!(err, TravelAiError::Parse { .. }));
    }

    #[test]
    fn test_parse_as_reports_shape_errors() {
        #[derive(Debug, serde::Deserialize)]
        struct Shape {
            #[allow(dead_code)]
            count: u32,
        }
        let err = parse_as::<Shape>(r#"{"count": "many"}"#).unwrap_err();
        assert!(matches!(err, TravelAiError::Parse { .. }));
    }
}
