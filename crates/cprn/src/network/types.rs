//! Core network types: vertices, facilities, edges and traversal direction.

use super::property::{PropertyMap, PropertyValue};
use crate::error::{CprnError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Vertex identifier (typically a 12 character geohash).
pub type VertexId = String;

/// Property key holding the edge weight.
pub const WEIGHT_KEY: &str = "weight";

/// Default property key holding the edge code.
pub const DEFAULT_EDGE_CODE_ATTR: &str = "edge_code";

/// Legacy row keys understood by [`Facility::from_properties`].
pub const FAC_CODE_KEY: &str = "fac_code";
/// Legacy row key for the facility type.
pub const FAC_TYPE_KEY: &str = "fac_type";
/// Legacy row key for the facility name.
pub const FAC_NAME_KEY: &str = "fac_name";

/// Traversal direction along the road network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow outgoing edges (successors)
    #[default]
    Downstream,
    /// Follow incoming edges (predecessors)
    Upstream,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Downstream => write!(f, "downstream"),
            Direction::Upstream => write!(f, "upstream"),
        }
    }
}

impl FromStr for Direction {
    type Err = CprnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "downstream" => Ok(Direction::Downstream),
            "upstream" => Ok(Direction::Upstream),
            other => Err(CprnError::invalid_argument(format!(
                "direction must be 'downstream' or 'upstream', got '{other}'"
            ))),
        }
    }
}

/// A facility (service area, toll gate, interchange, ...) hosted by a vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Unique facility code
    pub code: String,
    /// Facility type tag (open vocabulary)
    pub fac_type: String,
    /// Human-readable name
    pub name: String,
    /// Passthrough attributes (geometry, distance to representative point, ...)
    pub attributes: PropertyMap,
}

impl Facility {
    /// Create a facility with no auxiliary attributes.
    pub fn new(code: impl Into<String>, fac_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            fac_type: fac_type.into(),
            name: name.into(),
            attributes: PropertyMap::new(),
        }
    }

    /// Builder pattern: add an auxiliary attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Build a facility from a flat legacy row.
    ///
    /// `fac_code` and `fac_type` are required string columns, `fac_name`
    /// defaults to empty; every other column becomes an auxiliary attribute.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidArgument`] if a required column is missing.
    pub fn from_properties(mut row: PropertyMap) -> Result<Self> {
        let code = take_string(&mut row, FAC_CODE_KEY)?;
        let fac_type = take_string(&mut row, FAC_TYPE_KEY)?;
        let name = match row.remove(FAC_NAME_KEY) {
            Some(PropertyValue::String(s)) => s,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        Ok(Self {
            code,
            fac_type,
            name,
            attributes: row,
        })
    }

    /// Flatten into a single row using the legacy column names.
    pub fn to_properties(&self) -> PropertyMap {
        let mut row = self.attributes.clone();
        row.insert(FAC_CODE_KEY, self.code.as_str());
        row.insert(FAC_TYPE_KEY, self.fac_type.as_str());
        row.insert(FAC_NAME_KEY, self.name.as_str());
        row
    }
}

fn take_string(row: &mut PropertyMap, key: &str) -> Result<String> {
    match row.remove(key) {
        Some(PropertyValue::String(s)) => Ok(s),
        Some(PropertyValue::Int(i)) => Ok(i.to_string()),
        Some(other) => Err(CprnError::invalid_argument(format!(
            "facility column '{key}' must be a string, got {}",
            other.type_name()
        ))),
        None => Err(CprnError::invalid_argument(format!(
            "facility row is missing column '{key}'"
        ))),
    }
}

/// A vertex of the road-refline network.
///
/// Type tags are derived from the hosted facilities and rebuilt on
/// deserialization, so they never disagree with `facilities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredVertex")]
pub struct Vertex {
    /// Unique identifier
    pub id: VertexId,
    /// Free-form vertex attributes
    pub properties: PropertyMap,
    facilities: Vec<Facility>,
    #[serde(skip)]
    fac_types: BTreeSet<String>,
}

/// Serialized form of a [`Vertex`].
#[derive(Deserialize)]
struct StoredVertex {
    id: VertexId,
    #[serde(default)]
    properties: PropertyMap,
    #[serde(default)]
    facilities: Vec<Facility>,
}

impl From<StoredVertex> for Vertex {
    fn from(stored: StoredVertex) -> Self {
        let mut vertex = Vertex::new(stored.id);
        vertex.properties = stored.properties;
        for facility in stored.facilities {
            vertex.add_facility(facility);
        }
        vertex
    }
}

impl Vertex {
    /// Create a vertex with no facilities.
    pub fn new(id: impl Into<VertexId>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyMap::new(),
            facilities: Vec::new(),
            fac_types: BTreeSet::new(),
        }
    }

    /// Builder pattern: attach a facility.
    pub fn with_facility(mut self, facility: Facility) -> Self {
        self.add_facility(facility);
        self
    }

    /// Builder pattern: add a vertex property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Attach a facility and update the type tags.
    pub fn add_facility(&mut self, facility: Facility) {
        self.fac_types.insert(facility.fac_type.clone());
        self.facilities.push(facility);
    }

    /// Whether this vertex hosts at least one facility.
    pub fn is_facility_host(&self) -> bool {
        !self.facilities.is_empty()
    }

    /// Facilities hosted by this vertex, in insertion order.
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// Type tags summarizing the hosted facilities.
    pub fn facility_types(&self) -> &BTreeSet<String> {
        &self.fac_types
    }
}

/// A directed edge of the road-refline network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source vertex ID
    pub source_id: VertexId,
    /// Target vertex ID
    pub target_id: VertexId,
    /// Edge attributes (weight, edge code, class, lane, ...)
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new edge.
    pub fn new(source_id: impl Into<VertexId>, target_id: impl Into<VertexId>, properties: PropertyMap) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            properties,
        }
    }

    /// Traversal cost; 1 when the `weight` property is absent or not numeric.
    pub fn weight(&self) -> f64 {
        self.properties.get_number(WEIGHT_KEY).unwrap_or(1.0)
    }

    /// Edge code stored under `attr`, if any.
    pub fn edge_code(&self, attr: &str) -> Option<String> {
        match self.properties.get(attr)? {
            PropertyValue::String(s) => Some(s.clone()),
            PropertyValue::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }
}
