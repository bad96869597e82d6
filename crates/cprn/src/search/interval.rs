//! Interval table: search records joined with the facilities at both ends
//! of each leg.

use super::record::SearchRecord;
use crate::network::{Facility, VertexId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One leg between consecutive facility matches on a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalRow {
    /// Vertex the search started from
    pub vtx_start: VertexId,
    /// Start of the leg
    pub vtx_intvl_src: VertexId,
    /// End of the leg
    pub vtx_intvl_tgt: VertexId,
    /// Facility-match depth at the end of the leg
    pub depth: u32,
    /// Weight of the leg
    pub interval_weight: f64,
    /// Weight from the start vertex
    pub cumulative_weight: f64,
    /// Number of coded edges on the leg
    pub interval_edge_count: usize,
    /// Facility code at the leg start
    pub fac_code_src: Option<String>,
    /// Facility name at the leg start
    pub fac_name_src: Option<String>,
    /// Facility type at the leg start
    pub fac_type_src: Option<String>,
    /// Facility code at the leg end
    pub fac_code_tgt: Option<String>,
    /// Facility name at the leg end
    pub fac_name_tgt: Option<String>,
    /// Facility type at the leg end
    pub fac_type_tgt: Option<String>,
    /// Leg end is past the depth budget
    pub reached_max_depth: bool,
    /// Leg end is a distance-exhausted marker
    pub reached_max_distance: bool,
}

impl IntervalRow {
    /// Column names in CSV order.
    pub const COLUMNS: [&'static str; 15] = [
        "vtx_start",
        "vtx_intvl_src",
        "vtx_intvl_tgt",
        "depth",
        "interval_weight",
        "cumulative_weight",
        "interval_edge_count",
        "fac_code_src",
        "fac_name_src",
        "fac_type_src",
        "fac_code_tgt",
        "fac_name_tgt",
        "fac_type_tgt",
        "reach_max_depth",
        "reach_max_dist",
    ];

    fn new(record: &SearchRecord, source: Option<&Facility>) -> Self {
        let target = record.facility.as_ref();
        Self {
            vtx_start: record.start_vertex.clone(),
            vtx_intvl_src: record.interval_source.clone(),
            vtx_intvl_tgt: record.vertex.clone(),
            depth: record.depth,
            interval_weight: record.interval_weight,
            cumulative_weight: record.cumulative_weight,
            interval_edge_count: record.interval_edges.len(),
            fac_code_src: source.map(|f| f.code.clone()),
            fac_name_src: source.map(|f| f.name.clone()),
            fac_type_src: source.map(|f| f.fac_type.clone()),
            fac_code_tgt: target.map(|f| f.code.clone()),
            fac_name_tgt: target.map(|f| f.name.clone()),
            fac_type_tgt: target.map(|f| f.fac_type.clone()),
            reached_max_depth: record.reached_max_depth,
            reached_max_distance: record.reached_max_distance,
        }
    }

    /// Cell values in [`COLUMNS`](Self::COLUMNS) order.
    pub fn cells(&self) -> Vec<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            self.vtx_start.clone(),
            self.vtx_intvl_src.clone(),
            self.vtx_intvl_tgt.clone(),
            self.depth.to_string(),
            self.interval_weight.to_string(),
            self.cumulative_weight.to_string(),
            self.interval_edge_count.to_string(),
            opt(&self.fac_code_src),
            opt(&self.fac_name_src),
            opt(&self.fac_type_src),
            opt(&self.fac_code_tgt),
            opt(&self.fac_name_tgt),
            opt(&self.fac_type_tgt),
            self.reached_max_depth.to_string(),
            self.reached_max_distance.to_string(),
        ]
    }
}

/// Left-join every record with the facilities discovered at its interval
/// source vertex.
///
/// Source facilities are taken from `records` itself, so they are always of
/// the searched types. A record whose source vertex hosts several discovered
/// facilities yields one row per source facility; a record whose source
/// hosts none (the start vertex of a plain search) yields a single row with
/// empty source columns. Row order follows record order.
pub fn interval_table(records: &[SearchRecord]) -> Vec<IntervalRow> {
    let mut by_vertex: HashMap<&str, Vec<&Facility>> = HashMap::new();
    for record in records {
        if let Some(facility) = &record.facility {
            by_vertex.entry(record.vertex.as_str()).or_default().push(facility);
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        match by_vertex.get(record.interval_source.as_str()) {
            Some(sources) => {
                rows.extend(sources.iter().map(|src| IntervalRow::new(record, Some(*src))));
            }
            None => rows.push(IntervalRow::new(record, None)),
        }
    }
    rows
}
