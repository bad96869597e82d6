//! Output records of a facility search.

use crate::network::{Facility, PropertyMap, VertexId};
use serde::{Deserialize, Serialize};

/// One discovered facility, or one distance-exhausted frontier marker.
///
/// Traversal metadata describes the branch that reached [`vertex`](Self::vertex):
/// the interval fields cover the leg since the previous facility match
/// (anchored at [`interval_source`](Self::interval_source)), the cumulative
/// fields cover the whole path from the start vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Vertex the search started from
    pub start_vertex: VertexId,
    /// Vertex of the previous facility match on this branch (or the start)
    pub interval_source: VertexId,
    /// Vertex where the facility was found or the budget ran out
    pub vertex: VertexId,
    /// Number of facility matches along the branch, this one included
    pub depth: u32,
    /// Edge weight accumulated since `interval_source`
    pub interval_weight: f64,
    /// Edge weight accumulated since the start vertex
    pub cumulative_weight: f64,
    /// Edge codes traversed since `interval_source`
    pub interval_edges: Vec<String>,
    /// Edge codes traversed since the start vertex
    pub cumulative_edges: Vec<String>,
    /// The matched facility; `None` for distance markers
    pub facility: Option<Facility>,
    /// The match pushed the branch past the depth budget
    pub reached_max_depth: bool,
    /// The branch ran out of distance budget here
    pub reached_max_distance: bool,
}

impl SearchRecord {
    /// Whether this is a distance-exhausted marker rather than a facility.
    pub fn is_marker(&self) -> bool {
        self.facility.is_none()
    }

    /// Code of the matched facility.
    pub fn facility_code(&self) -> Option<&str> {
        self.facility.as_ref().map(|f| f.code.as_str())
    }

    /// Flatten into one row: facility columns (`fac_code`, `fac_type`,
    /// `fac_name`, auxiliary attributes) plus traversal columns.
    ///
    /// Traversal columns win over facility attributes with the same name.
    pub fn to_properties(&self) -> PropertyMap {
        let mut row = self
            .facility
            .as_ref()
            .map(Facility::to_properties)
            .unwrap_or_default();
        row.insert("vtx_start", self.start_vertex.as_str());
        row.insert("vtx_intvl_src", self.interval_source.as_str());
        row.insert("vtx_intvl_tgt", self.vertex.as_str());
        row.insert("depth", self.depth);
        row.insert("interval_weight", self.interval_weight);
        row.insert("cumulative_weight", self.cumulative_weight);
        row.insert("interval_edges", self.interval_edges.clone());
        row.insert("cumulative_edges", self.cumulative_edges.clone());
        row.insert("reach_max_depth", self.reached_max_depth);
        row.insert("reach_max_dist", self.reached_max_distance);
        row
    }
}
