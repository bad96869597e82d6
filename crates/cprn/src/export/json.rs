//! JSON export of search records and interval rows.

use crate::error::{CprnError, Result};
use crate::network::{PropertyMap, PropertyValue};
use crate::search::{IntervalRow, SearchRecord};
use serde_json::{json, Value};

/// Search records as a JSON document `{"records": [...]}`, each record
/// flattened the same way as the CSV export.
pub fn to_json(records: &[SearchRecord]) -> Result<String> {
    let rows: Vec<Value> = records
        .iter()
        .map(|r| properties_to_json(&r.to_properties()))
        .collect();
    pretty(&json!({ "records": rows }))
}

/// Interval rows as a JSON document `{"intervals": [...]}`.
pub fn intervals_to_json(rows: &[IntervalRow]) -> Result<String> {
    pretty(&json!({ "intervals": rows }))
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CprnError::serialization("Failed to serialize JSON export", Some(e)))
}

/// Convert PropertyMap to JSON object
fn properties_to_json(props: &PropertyMap) -> Value {
    let mut obj = serde_json::Map::new();

    for (key, value) in props.iter() {
        let json_value = match value {
            PropertyValue::String(s) => json!(s),
            PropertyValue::Int(i) => json!(i),
            PropertyValue::Float(f) => json!(f),
            PropertyValue::Bool(b) => json!(b),
            PropertyValue::StringList(v) => json!(v),
            PropertyValue::IntList(v) => json!(v),
            PropertyValue::Null => json!(null),
        };
        obj.insert(key.clone(), json_value);
    }

    Value::Object(obj)
}
