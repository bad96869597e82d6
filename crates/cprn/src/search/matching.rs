//! Facility type filtering and code avoidance.

use crate::network::{Facility, Vertex};
use std::collections::BTreeSet;

/// Selects the facilities of a vertex that a search may report.
///
/// A vertex is a candidate only when its type tags intersect the target
/// types; its facility list is then narrowed to those types and the avoided
/// codes are removed. Already-visited tracking is left to the caller.
#[derive(Debug, Clone, Copy)]
pub struct FacilityMatcher<'a> {
    target_types: &'a BTreeSet<String>,
    avoid_codes: &'a BTreeSet<String>,
}

impl<'a> FacilityMatcher<'a> {
    /// Create a matcher for the given target types and avoided codes.
    pub fn new(target_types: &'a BTreeSet<String>, avoid_codes: &'a BTreeSet<String>) -> Self {
        Self {
            target_types,
            avoid_codes,
        }
    }

    /// Reportable facilities of `vertex`, in the vertex's facility order.
    pub fn matching<'v>(&self, vertex: &'v Vertex) -> Vec<&'v Facility> {
        if !vertex.is_facility_host() || vertex.facility_types().is_disjoint(self.target_types) {
            return Vec::new();
        }
        vertex
            .facilities()
            .iter()
            .filter(|f| self.target_types.contains(&f.fac_type))
            .filter(|f| !self.avoid_codes.contains(&f.code))
            .collect()
    }
}
