//! Property system for vertex, edge and facility attributes.
//!
//! Attribute maps are ordered by key so flattening and export are
//! deterministic across runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strongly-typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// String value (codes, names, geohashes, WKT)
    String(String),
    /// Integer value (lane counts, class codes)
    Int(i64),
    /// Floating point value (weights, distances)
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// List of strings (edge code lists)
    StringList(Vec<String>),
    /// List of integers
    IntList(Vec<i64>),
    /// Explicit null/absence of value
    Null,
}

impl PropertyValue {
    /// Numeric view of the value; integers are widened to `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::StringList(_) => "string list",
            PropertyValue::IntList(_) => "int list",
            PropertyValue::Null => "null",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{s}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Float(v) => write!(f, "{v}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::StringList(v) => write!(f, "{}", v.join(";")),
            PropertyValue::IntList(v) => {
                let parts: Vec<String> = v.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", parts.join(";"))
            }
            PropertyValue::Null => Ok(()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::StringList(value)
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(value: Vec<i64>) -> Self {
        PropertyValue::IntList(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Null, Into::into)
    }
}

/// Ordered key-value attribute store for vertices, edges and facilities.
///
/// Provides builder pattern and type-safe getters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    data: BTreeMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Create a new empty property map.
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Builder pattern: add a property and return self.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Insert a property value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.data.insert(key.into(), value.into())
    }

    /// Get a property value by key.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }

    /// Remove a property by key.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.data.remove(key)
    }

    /// Check if a property exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Get the number of properties.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the property map is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.data.iter()
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Copy every entry of `other` into this map, overwriting duplicates.
    pub fn extend_from(&mut self, other: &PropertyMap) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Type-safe getter for string properties.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.data.get(key) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Type-safe getter for integer properties.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.data.get(key) {
            Some(PropertyValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Type-safe getter for float properties.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.data.get(key) {
            Some(PropertyValue::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Numeric getter accepting both integer and float properties.
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(PropertyValue::as_number)
    }

    /// Type-safe getter for boolean properties.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.data.get(key) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Type-safe getter for string list properties.
    pub fn get_string_list(&self, key: &str) -> Option<&[String]> {
        match self.data.get(key) {
            Some(PropertyValue::StringList(list)) => Some(list),
            _ => None,
        }
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Self {
            data: BTreeMap::from_iter(iter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_map_builder() {
        let props = PropertyMap::new()
            .with("edge_code", "E-001")
            .with("lane", 3i64)
            .with("is_ramp", true);

        assert_eq!(props.get_string("edge_code"), Some("E-001"));
        assert_eq!(props.get_int("lane"), Some(3));
        assert_eq!(props.get_bool("is_ramp"), Some(true));
    }

    #[test]
    fn test_get_number_widens_ints() {
        let props = PropertyMap::new().with("weight", 12i64).with("dist", 0.5);
        assert_eq!(props.get_number("weight"), Some(12.0));
        assert_eq!(props.get_number("dist"), Some(0.5));
        assert_eq!(props.get_float("weight"), None);
    }

    #[test]
    fn test_wrong_type_returns_none() {
        let props = PropertyMap::new().with("name", "G2").with("lane", 2i64);
        assert_eq!(props.get_int("name"), None);
        assert_eq!(props.get_string("lane"), None);
        assert_eq!(props.get_number("name"), None);
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let props = PropertyMap::new().with("z", 1i64).with("a", 2i64).with("m", 3i64);
        let keys: Vec<&String> = props.keys().collect();
        assert_eq!(keys, ["a", "m", "z"]);
    }

    #[test]
    fn test_display_values() {
        assert_eq!(PropertyValue::from(vec!["a".to_string(), "b".to_string()]).to_string(), "a;b");
        assert_eq!(PropertyValue::Null.to_string(), "");
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::Null);
    }

    #[test]
    fn test_serde_is_transparent() {
        let props = PropertyMap::new().with("weight", 2.5);
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"weight":{"Float":2.5}}"#);
        let back: PropertyMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, props);
    }
}
