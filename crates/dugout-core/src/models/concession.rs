use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::lenient_id;

/// A concession stand item. Only `id` is interpreted; the rest of the record
/// belongs to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ConcessionItem {
    pub fn new(id: i64, mut fields: Map<String, Value>) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_replaces_payload_id() {
        let fields = json!({"id": 40, "name": "Hot dog", "price": 2.5});
        let item = ConcessionItem::new(3, fields.as_object().cloned().unwrap());
        assert_eq!(item.id, 3);
        assert_eq!(item.name(), Some("Hot dog"));
        assert_eq!(serde_json::to_value(&item).unwrap()["id"], 3);
    }

    #[test]
    fn test_reads_loose_ids() {
        let items: Vec<ConcessionItem> =
            serde_json::from_value(json!([{"id": 1.0, "name": "Soda"}, {"name": "Candy"}]))
                .expect("Failed to parse concession JSON");
        assert_eq!(items[0].id, 1);
        assert_eq!(items[1].id, 0);
        assert_eq!(items[1].name(), Some("Candy"));
    }
}
