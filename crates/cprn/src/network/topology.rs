//! Read-only graph contract consumed by the traversal engine.

use super::types::{Direction, Edge, Vertex, VertexId};
use crate::error::Result;

/// Read-only view of a directed road network.
///
/// The facility search only needs these three lookups, so any resident graph
/// can be searched by implementing this trait. Implementations must not
/// mutate themselves during lookups; the search borrows the graph immutably
/// and several searches may share it across threads.
pub trait RoadGraph {
    /// Look up a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::VertexNotFound`](crate::CprnError::VertexNotFound) if the vertex doesn't exist.
    fn vertex(&self, id: &str) -> Result<&Vertex>;

    /// Successors (`Downstream`) or predecessors (`Upstream`) of a vertex,
    /// in a stable order.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::VertexNotFound`](crate::CprnError::VertexNotFound) if the vertex doesn't exist.
    fn neighbors(&self, id: &str, direction: Direction) -> Result<&[VertexId]>;

    /// Look up the directed edge `source -> target`.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::EdgeNotFound`](crate::CprnError::EdgeNotFound) if the edge doesn't exist.
    fn edge(&self, source: &str, target: &str) -> Result<&Edge>;

    /// Edge joining `current` to `neighbor` when walking in `direction`.
    ///
    /// Downstream walks traverse `current -> neighbor`, upstream walks
    /// traverse `neighbor -> current` in reverse.
    fn connecting_edge(&self, current: &str, neighbor: &str, direction: Direction) -> Result<&Edge> {
        match direction {
            Direction::Downstream => self.edge(current, neighbor),
            Direction::Upstream => self.edge(neighbor, current),
        }
    }
}
