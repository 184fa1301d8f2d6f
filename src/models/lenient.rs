//! Tolerant field deserializers for provider payloads
//!
//! Generated content is loose about scalar types: prices arrive as numbers,
//! durations as "2 hours", ratings as strings. These helpers accept the common
//! variants and fall back to a default instead of rejecting the whole record.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept strings, numbers and booleans as a string; null becomes empty
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Like [`string`] but keeps absence and empty text as `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = string(deserializer)?;
    Ok(Some(value).filter(|s| !s.trim().is_empty()))
}

/// Duration in minutes from a number or a phrase like "90", "2 hours", "1.5 hrs"
pub fn opt_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().and_then(to_minutes),
        Value::String(s) => parse_minutes(&s),
        _ => None,
    })
}

/// Duration in minutes, zero when unusable
pub fn minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_minutes(deserializer)?.unwrap_or_default())
}

/// Floating point value from a number or a numeric string, else `None`
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => leading_number(&s),
        _ => None,
    })
}

/// Floating point value, zero when unusable
pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64(deserializer)?.unwrap_or_default())
}

/// Priority-like small integer, `None` when unusable
pub fn opt_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64(deserializer)?
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= f64::from(u8::MAX))
        .map(|v| v.round() as u8))
}

/// Ranking between 1 and 5; unusable values rank lowest
pub fn priority<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_u8(deserializer)?.map_or(3, |p| p.clamp(1, 5)))
}

/// A list that may arrive as a single string, a list, or null
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

/// Parse a free-text duration into minutes
#[must_use]
pub fn parse_minutes(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let value = leading_number(&lower)?;
    let factor = if lower.contains("hour") || lower.contains("hr") {
        60.0
    } else if lower.contains("day") {
        24.0 * 60.0
    } else {
        1.0
    };
    to_minutes(value * factor)
}

fn to_minutes(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX)).then(|| value.round() as u32)
}

/// First decimal number in `text`, ignoring thousands separators
fn leading_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "string")]
        text: String,
        #[serde(default, deserialize_with = "opt_minutes")]
        minutes: Option<u32>,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
    }

    #[rstest]
    #[case("90", Some(90))]
    #[case("2 hours", Some(120))]
    #[case("1.5 hrs", Some(90))]
    #[case("about 45 minutes", Some(45))]
    #[case("N/A", None)]
    fn test_parse_minutes(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_minutes(input), expected);
    }

    #[test]
    fn test_numbers_become_strings() {
        let loose: Loose =
            serde_json::from_str(r#"{"text": 1500, "minutes": 120.4, "tags": "history"}"#).unwrap();
        assert_eq!(loose.text, "1500");
        assert_eq!(loose.minutes, Some(120));
        assert_eq!(loose.tags, vec!["history".to_string()]);
    }

    #[test]
    fn test_missing_and_null_fields() {
        let loose: Loose = serde_json::from_str(r#"{"text": null}"#).unwrap();
        assert!(loose.text.is_empty());
        assert!(loose.minutes.is_none());
        assert!(loose.tags.is_empty());
    }
}
