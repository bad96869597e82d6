//! In-memory road-refline network.

use super::property::PropertyMap;
use super::query::FacilityQuery;
use super::topology::RoadGraph;
use super::types::{Direction, Edge, Facility, Vertex, VertexId};
use crate::error::{CprnError, Result};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A facility together with the vertex hosting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacilityRef<'a> {
    /// Hosting vertex
    pub vertex_id: &'a str,
    /// The facility record
    pub facility: &'a Facility,
}

/// Serializable form of a [`RoadNetwork`]: vertices and edges in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    /// All vertices, in insertion order
    pub vertices: Vec<Vertex>,
    /// All edges, in insertion order
    pub edges: Vec<Edge>,
}

/// Directed, weighted road-refline network resident in memory.
///
/// Vertices, edges and adjacency lists keep insertion order, so traversals
/// over an unmodified network are deterministic. The type has no interior
/// mutability and can be shared by reference across threads.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    vertices: Vec<Vertex>,
    vertex_index: HashMap<VertexId, usize>,
    edges: Vec<Edge>,
    // source -> target -> position in `edges`
    edge_index: HashMap<VertexId, HashMap<VertexId, usize>>,
    successors: HashMap<VertexId, Vec<VertexId>>,
    predecessors: HashMap<VertexId, Vec<VertexId>>,
}

impl RoadNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidOperation`] if a vertex with the same ID exists.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<()> {
        if self.vertex_index.contains_key(&vertex.id) {
            return Err(CprnError::InvalidOperation {
                message: format!("duplicate vertex '{}'", vertex.id),
            });
        }
        trace!("Adding vertex: id={}, facilities={}", vertex.id, vertex.facilities().len());
        self.successors.insert(vertex.id.clone(), Vec::new());
        self.predecessors.insert(vertex.id.clone(), Vec::new());
        self.vertex_index.insert(vertex.id.clone(), self.vertices.len());
        self.vertices.push(vertex);
        Ok(())
    }

    /// Attach a facility to an existing vertex.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::VertexNotFound`] if the vertex doesn't exist.
    pub fn add_facility(&mut self, vertex_id: &str, facility: Facility) -> Result<()> {
        let idx = self.index_of(vertex_id)?;
        debug!("Attaching facility {} ({}) to {vertex_id}", facility.code, facility.fac_type);
        self.vertices[idx].add_facility(facility);
        Ok(())
    }

    /// Add a directed edge `source -> target`.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::VertexNotFound`] if either endpoint is missing and
    /// [`CprnError::InvalidOperation`] if the edge already exists.
    pub fn add_edge(&mut self, source: &str, target: &str, properties: PropertyMap) -> Result<()> {
        self.index_of(source)?;
        self.index_of(target)?;
        if self.edge_index.get(source).is_some_and(|t| t.contains_key(target)) {
            return Err(CprnError::InvalidOperation {
                message: format!("duplicate edge '{source}' -> '{target}'"),
            });
        }
        trace!("Adding edge: {source} -> {target}");

        self.edge_index
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string(), self.edges.len());
        self.edges.push(Edge::new(source, target, properties));

        self.successors
            .entry(source.to_string())
            .or_default()
            .push(target.to_string());
        self.predecessors
            .entry(target.to_string())
            .or_default()
            .push(source.to_string());
        Ok(())
    }

    /// Get the total number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check whether a vertex exists.
    pub fn contains_vertex(&self, id: &str) -> bool {
        self.vertex_index.contains_key(id)
    }

    /// Iterate over vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    /// Iterate over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Iterate over vertices hosting at least one facility.
    pub fn facility_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter(|v| v.is_facility_host())
    }

    /// Start a fluent query over all hosted facilities.
    pub fn facilities(&self) -> FacilityQuery<'_> {
        FacilityQuery::new(self)
    }

    /// Every hosted facility, in vertex then facility order.
    pub fn list_facilities(&self) -> Vec<FacilityRef<'_>> {
        self.facility_vertices()
            .flat_map(|v| {
                v.facilities().iter().map(move |f| FacilityRef {
                    vertex_id: v.id.as_str(),
                    facility: f,
                })
            })
            .collect()
    }

    /// Find a facility by its code.
    pub fn query_facility(&self, code: &str) -> Option<FacilityRef<'_>> {
        self.facilities().code(code).execute().into_iter().next()
    }

    /// Edges carrying one of `codes` under `attr`, in the order of `codes`.
    ///
    /// Unknown codes are skipped; duplicates in `codes` yield duplicate edges.
    pub fn edges_by_codes<S: AsRef<str>>(&self, codes: &[S], attr: &str) -> Vec<&Edge> {
        if codes.is_empty() {
            return Vec::new();
        }
        let wanted: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        let mut by_code: HashMap<String, &Edge> = HashMap::with_capacity(wanted.len());
        for edge in &self.edges {
            if let Some(code) = edge.edge_code(attr) {
                if wanted.contains(code.as_str()) {
                    by_code.entry(code).or_insert(edge);
                }
            }
        }

        let found: Vec<&Edge> = codes
            .iter()
            .filter_map(|c| by_code.get(c.as_ref()).copied())
            .collect();
        debug!("Edge code lookup: {} requested, {} found", codes.len(), found.len());
        found
    }

    /// Nested form of [`edges_by_codes`](Self::edges_by_codes): one result list per group.
    pub fn edges_by_code_groups<S: AsRef<str>>(&self, groups: &[Vec<S>], attr: &str) -> Vec<Vec<&Edge>> {
        groups.iter().map(|g| self.edges_by_codes(g, attr)).collect()
    }

    /// Copy the network into its serializable form.
    pub fn to_snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Rebuild a network (and its indexes) from a snapshot.
    ///
    /// # Errors
    ///
    /// Fails like [`add_vertex`](Self::add_vertex) and [`add_edge`](Self::add_edge)
    /// on duplicates or dangling edge endpoints.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> Result<Self> {
        let mut network = Self::new();
        for vertex in snapshot.vertices {
            network.add_vertex(vertex)?;
        }
        for edge in snapshot.edges {
            network.add_edge(&edge.source_id, &edge.target_id, edge.properties)?;
        }
        debug!(
            "Rebuilt network: {} vertices, {} edges",
            network.vertex_count(),
            network.edge_count()
        );
        Ok(network)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.vertex_index
            .get(id)
            .copied()
            .ok_or_else(|| CprnError::VertexNotFound {
                vertex_id: id.to_string(),
            })
    }
}

impl RoadGraph for RoadNetwork {
    fn vertex(&self, id: &str) -> Result<&Vertex> {
        let idx = self.index_of(id)?;
        Ok(&self.vertices[idx])
    }

    fn neighbors(&self, id: &str, direction: Direction) -> Result<&[VertexId]> {
        let adjacency = match direction {
            Direction::Downstream => &self.successors,
            Direction::Upstream => &self.predecessors,
        };
        adjacency
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| CprnError::VertexNotFound {
                vertex_id: id.to_string(),
            })
    }

    fn edge(&self, source: &str, target: &str) -> Result<&Edge> {
        self.edge_index
            .get(source)
            .and_then(|targets| targets.get(target))
            .map(|&idx| &self.edges[idx])
            .ok_or_else(|| CprnError::EdgeNotFound {
                source_id: source.to_string(),
                target_id: target.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RoadNetwork {
        let mut net = RoadNetwork::new();
        for id in ["a", "b", "c"] {
            net.add_vertex(Vertex::new(id)).unwrap();
        }
        net.add_edge("a", "b", PropertyMap::new().with("edge_code", "ab").with("weight", 2i64))
            .unwrap();
        net.add_edge("b", "c", PropertyMap::new().with("edge_code", "bc")).unwrap();
        net.add_edge("a", "c", PropertyMap::new().with("edge_code", "ac")).unwrap();
        net
    }

    #[test]
    fn test_neighbors_by_direction() {
        let net = triangle();
        assert_eq!(net.neighbors("a", Direction::Downstream).unwrap(), ["b", "c"]);
        assert_eq!(net.neighbors("c", Direction::Upstream).unwrap(), ["b", "a"]);
        assert!(net.neighbors("c", Direction::Downstream).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_vertex_is_not_found() {
        let net = triangle();
        assert!(matches!(
            net.neighbors("zz", Direction::Downstream),
            Err(CprnError::VertexNotFound { .. })
        ));
        assert!(matches!(net.vertex("zz"), Err(CprnError::VertexNotFound { .. })));
    }

    #[test]
    fn test_connecting_edge_respects_direction() {
        let net = triangle();
        let down = net.connecting_edge("a", "b", Direction::Downstream).unwrap();
        assert_eq!(down.edge_code("edge_code").as_deref(), Some("ab"));
        let up = net.connecting_edge("b", "a", Direction::Upstream).unwrap();
        assert_eq!(up.weight(), 2.0);
        assert!(matches!(
            net.edge("b", "a"),
            Err(CprnError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_vertex_and_edge_rejected() {
        let mut net = triangle();
        assert!(matches!(
            net.add_vertex(Vertex::new("a")),
            Err(CprnError::InvalidOperation { .. })
        ));
        assert!(matches!(
            net.add_edge("a", "b", PropertyMap::new()),
            Err(CprnError::InvalidOperation { .. })
        ));
        assert!(matches!(
            net.add_edge("a", "zz", PropertyMap::new()),
            Err(CprnError::VertexNotFound { .. })
        ));
    }

    #[test]
    fn test_edges_by_codes_keeps_request_order() {
        let net = triangle();
        let edges = net.edges_by_codes(&["bc", "missing", "ab"], "edge_code");
        let codes: Vec<String> = edges.iter().filter_map(|e| e.edge_code("edge_code")).collect();
        assert_eq!(codes, ["bc", "ab"]);
        assert!(net.edges_by_codes::<&str>(&[], "edge_code").is_empty());
    }

    #[test]
    fn test_edges_by_code_groups() {
        let net = triangle();
        let groups = vec![vec!["ab", "bc"], vec!["ac"], vec![]];
        let found = net.edges_by_code_groups(&groups, "edge_code");
        assert_eq!(found.iter().map(Vec::len).collect::<Vec<_>>(), [2, 1, 0]);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let mut net = triangle();
        net.add_facility("c", Facility::new("F1", "fuel", "C services")).unwrap();
        let rebuilt = RoadNetwork::from_snapshot(net.to_snapshot()).unwrap();
        assert_eq!(rebuilt.vertex_count(), 3);
        assert_eq!(rebuilt.edge_count(), 3);
        assert_eq!(rebuilt.neighbors("a", Direction::Downstream).unwrap(), ["b", "c"]);
        assert_eq!(rebuilt.query_facility("F1").unwrap().vertex_id, "c");
    }
}
