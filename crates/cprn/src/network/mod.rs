//! Road-refline network model.
//!
//! This module defines the fundamental building blocks:
//! - [`Vertex`] and [`Facility`]: network points and the facilities they host
//! - [`Edge`]: weighted, directed road segments
//! - [`RoadGraph`]: the read-only contract the facility search runs against
//! - [`RoadNetwork`]: the in-memory implementation

mod persist;
mod property;
mod query;
mod roadnet;
mod topology;
mod types;

pub use property::{PropertyMap, PropertyValue};
pub use query::FacilityQuery;
pub use roadnet::{FacilityRef, NetworkSnapshot, RoadNetwork};
pub use topology::RoadGraph;
pub use types::{
    Direction, Edge, Facility, Vertex, VertexId, DEFAULT_EDGE_CODE_ATTR, FAC_CODE_KEY, FAC_NAME_KEY,
    FAC_TYPE_KEY, WEIGHT_KEY,
};
