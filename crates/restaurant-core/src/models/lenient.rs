//! Deserializers for backend fields that arrive with inconsistent JSON types.
//!
//! Records seeded by the backend carry numbers and booleans, while records
//! written through its REST endpoints come back string-encoded (`"true"`,
//! `"4"`, ISO-8601 timestamps).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a favorite flag.
///
/// Total and idempotent: `true` and `"true"` map to `true`; `false`,
/// `"false"`, a missing value, and anything else map to `false`.
pub fn parse_favorite(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text == "true",
        _ => false,
    }
}

pub fn favorite<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_favorite(value.as_ref()))
}

pub fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let rating = match &value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    rating
        .and_then(|rating| u8::try_from(rating).ok())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid rating: {value}")))
}

pub fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_timestamp(deserializer)?.unwrap_or_default())
}

pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(timestamp_millis))
}

fn timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok().or_else(|| {
            chrono::DateTime::parse_from_rfc3339(text.trim())
                .ok()
                .map(|parsed| parsed.timestamp_millis())
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_favorite_accepts_legacy_strings() {
        assert!(parse_favorite(Some(&json!(true))));
        assert!(parse_favorite(Some(&json!("true"))));

        assert!(!parse_favorite(Some(&json!(false))));
        assert!(!parse_favorite(Some(&json!("false"))));
        assert!(!parse_favorite(None));
        assert!(!parse_favorite(Some(&Value::Null)));
        assert!(!parse_favorite(Some(&json!("TRUE "))));
        assert!(!parse_favorite(Some(&json!(1))));
    }

    #[test]
    fn parse_favorite_is_idempotent() {
        for input in [
            json!(true),
            json!("true"),
            json!(false),
            json!("false"),
            json!("yes"),
            json!(null),
            json!([]),
        ] {
            let once = parse_favorite(Some(&input));
            let twice = parse_favorite(Some(&Value::Bool(once)));
            assert_eq!(once, twice, "input {input}");
        }
    }

    #[test]
    fn timestamp_accepts_numbers_and_iso_strings() {
        assert_eq!(timestamp_millis(&json!(1_504_095_567_183_i64)), Some(1_504_095_567_183));
        assert_eq!(timestamp_millis(&json!("1504095567183")), Some(1_504_095_567_183));
        assert_eq!(
            timestamp_millis(&json!("2018-06-27T01:32:47.000Z")),
            Some(1_530_063_167_000)
        );
        assert_eq!(timestamp_millis(&json!("yesterday")), None);
    }
}
