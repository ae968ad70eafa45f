use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::record::{lenient_id, lenient_string};

/// How an inventory status counts toward the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Available,
    CheckedOut,
    NeedsRepair,
    Other,
}

impl StatusClass {
    /// Classify a free-form status. Accepts both the display form
    /// ("Needs Repair") and the slug form ("needs-repair").
    pub fn classify(status: &str) -> Self {
        let normalized: String = status
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();

        match normalized.as_str() {
            "available" | "in-stock" => StatusClass::Available,
            "checked-out" => StatusClass::CheckedOut,
            "needs-repair" => StatusClass::NeedsRepair,
            _ => StatusClass::Other,
        }
    }
}

/// An equipment record. Fields beyond the ones the store reads are kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub quantity: Value,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    /// Numeric quantity. Numbers and numeric strings count; anything else is 0.
    pub fn quantity_count(&self) -> i64 {
        match &self.quantity {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        self.status
            .as_deref()
            .map(StatusClass::classify)
            .unwrap_or(StatusClass::Other)
    }

    pub fn item_name(&self) -> Option<&str> {
        self.extra.get("item_name").and_then(Value::as_str)
    }
}

/// Aggregate counters over the inventory. Always derived, never stored.
/// Counters saturate at `i64::MAX` rather than overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub total_items: i64,
    pub available: i64,
    pub checked_out: i64,
    pub needs_repair: i64,
}

impl InventorySummary {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        items.iter().fold(Self::default(), |mut summary, item| {
            let quantity = item.quantity_count();
            summary.total_items = summary.total_items.saturating_add(quantity);
            match item.status_class() {
                StatusClass::Available => {
                    summary.available = summary.available.saturating_add(quantity)
                }
                StatusClass::CheckedOut => {
                    summary.checked_out = summary.checked_out.saturating_add(quantity)
                }
                StatusClass::NeedsRepair => {
                    summary.needs_repair = summary.needs_repair.saturating_add(quantity)
                }
                StatusClass::Other => {}
            }
            summary
        })
    }
}
