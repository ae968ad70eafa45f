//! Helpers for stored records whose shape was not necessarily written by us.
//!
//! Collections may have been written by other clients, so ids can arrive as
//! integral floats (`3.0`) or numeric strings, and optional text fields can
//! hold other JSON types. Reads accept these; id assignment looks at every
//! record so a new id never collides with an existing one.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer view of an id value. Fractional numbers round down.
pub fn as_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The `id` of a stored record, if it has a usable one.
pub fn id_of(record: &Value) -> Option<i64> {
    record.get("id").and_then(as_id)
}

/// One past the largest id in `records`, starting at 1. Records without a
/// usable id are skipped.
pub fn next_id(records: &[Value]) -> i64 {
    records
        .iter()
        .filter_map(id_of)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

/// `deserialize_with` for ids: anything unusable becomes 0.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_id(&value).unwrap_or(0))
}

/// `deserialize_with` for optional text: non-string values become `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_of() {
        assert_eq!(id_of(&json!({"id": 4})), Some(4));
        assert_eq!(id_of(&json!({"id": 4.0})), Some(4));
        assert_eq!(id_of(&json!({"id": 4.5})), Some(4));
        assert_eq!(id_of(&json!({"id": " 12 "})), Some(12));
        assert_eq!(id_of(&json!({"id": "twelve"})), None);
        assert_eq!(id_of(&json!({"name": "no id"})), None);
        assert_eq!(id_of(&json!(7)), None);
    }

    #[test]
    fn test_next_id_empty() {
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn test_next_id_uses_max_not_len() {
        // A gap left by a deleted item must not be refilled
        assert_eq!(next_id(&[json!({"id": 2})]), 3);
        assert_eq!(next_id(&[json!({"id": 5}), json!({"id": 1})]), 6);
    }

    #[test]
    fn test_next_id_skips_records_without_ids() {
        let records = [json!({"id": 5, "name": "Hot dog"}), json!({"name": "Imported soda"})];
        assert_eq!(next_id(&records), 6);

        let records = [json!({"id": 1.0}), json!({"id": "3"})];
        assert_eq!(next_id(&records), 4);
    }

    #[test]
    fn test_next_id_saturates() {
        assert_eq!(next_id(&[json!({"id": i64::MAX})]), i64::MAX);
        assert_eq!(next_id(&[json!({"id": 1e300})]), i64::MAX);
    }
}
