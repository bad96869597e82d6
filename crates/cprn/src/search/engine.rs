//! Bounded, direction-aware facility BFS.
//!
//! The frontier is a FIFO queue: entries are expanded strictly in discovery
//! order. When several branches reach the same vertex or facility, the
//! branch dequeued first wins. This is a hop-order tie-break, not a
//! shortest-path guarantee: the winning branch need not have the lowest
//! cumulative weight.
//!
//! Depth counts facility matches, not hops. Facilities at the start vertex
//! are reported at depth 0 and the first match after leaving it is depth 1.

use super::matching::FacilityMatcher;
use super::options::{CancelToken, SearchOptions};
use super::predicate::EdgePredicate;
use super::record::SearchRecord;
use crate::error::{CprnError, Result};
use crate::expr::EdgeQuery;
use crate::network::{Edge, Facility, RoadGraph, VertexId};
use log::{debug, info, trace};
use std::collections::{BTreeSet, HashSet, VecDeque};

macro_rules! step {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            trace!($($arg)+);
        }
    };
}

/// Transient traversal state of one queued branch.
#[derive(Debug, Clone)]
struct FrontierEntry {
    vertex: VertexId,
    anchor: VertexId,
    depth: u32,
    interval_weight: f64,
    cumulative_weight: f64,
    interval_edges: Vec<String>,
    cumulative_edges: Vec<String>,
}

impl FrontierEntry {
    fn seed(start: &str) -> Self {
        Self {
            vertex: start.to_string(),
            anchor: start.to_string(),
            depth: 0,
            interval_weight: 0.0,
            cumulative_weight: 0.0,
            interval_edges: Vec::new(),
            cumulative_edges: Vec::new(),
        }
    }

    /// Start a new interval at the current vertex.
    fn reset_interval(&mut self) {
        self.anchor = self.vertex.clone();
        self.interval_weight = 0.0;
        self.interval_edges.clear();
    }

    /// Branch continuing over `edge` to `next`.
    fn advance(&self, next: &str, weight: f64, edge_code: Option<String>) -> Self {
        let mut interval_edges = self.interval_edges.clone();
        let mut cumulative_edges = self.cumulative_edges.clone();
        if let Some(code) = edge_code {
            interval_edges.push(code.clone());
            cumulative_edges.push(code);
        }
        Self {
            vertex: next.to_string(),
            anchor: self.anchor.clone(),
            depth: self.depth,
            interval_weight: self.interval_weight + weight,
            cumulative_weight: self.cumulative_weight + weight,
            interval_edges,
            cumulative_edges,
        }
    }

    fn record(&self, start: &str, facility: Option<&Facility>) -> SearchRecord {
        SearchRecord {
            start_vertex: start.to_string(),
            interval_source: self.anchor.clone(),
            vertex: self.vertex.clone(),
            depth: self.depth,
            interval_weight: self.interval_weight,
            cumulative_weight: self.cumulative_weight,
            interval_edges: self.interval_edges.clone(),
            cumulative_edges: self.cumulative_edges.clone(),
            facility: facility.cloned(),
            reached_max_depth: false,
            reached_max_distance: false,
        }
    }
}

/// A configured facility search over a borrowed graph.
///
/// Each [`run`](Self::run) owns its visited sets, so one `FacilitySearch`
/// can be run repeatedly and several searches can share a graph.
///
/// # Examples
///
/// ```
/// use cprn::{FacilitySearch, Facility, PropertyMap, RoadNetwork, SearchOptions, Vertex};
///
/// # fn example() -> cprn::Result<()> {
/// let mut net = RoadNetwork::new();
/// net.add_vertex(Vertex::new("start"))?;
/// net.add_vertex(Vertex::new("a"))?;
/// net.add_vertex(Vertex::new("b").with_facility(Facility::new("F1", "fuel", "North")))?;
/// net.add_edge("start", "a", PropertyMap::new().with("weight", 1i64))?;
/// net.add_edge("a", "b", PropertyMap::new().with("weight", 2i64))?;
///
/// let records = FacilitySearch::new(&net, SearchOptions::default().with_max_distance(10.0))?
///     .run("start", ["fuel"])?;
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].depth, 1);
/// assert_eq!(records[0].cumulative_weight, 3.0);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct FacilitySearch<'g, G: RoadGraph + ?Sized> {
    graph: &'g G,
    options: SearchOptions,
    edge_query: Option<EdgeQuery>,
    edge_predicate: Option<Box<dyn EdgePredicate + 'g>>,
    cancel: Option<CancelToken>,
}

impl<'g, G: RoadGraph + ?Sized> FacilitySearch<'g, G> {
    /// Validate options and compile `avoid_edge_query`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidArgument`] for invalid options and
    /// [`CprnError::QueryParse`] for a malformed edge query.
    pub fn new(graph: &'g G, options: SearchOptions) -> Result<Self> {
        options.validate()?;
        let edge_query = options
            .avoid_edge_query
            .as_deref()
            .map(|q| EdgeQuery::parse(q).map(EdgeQuery::lenient))
            .transpose()?;
        Ok(Self {
            graph,
            options,
            edge_query,
            edge_predicate: None,
            cancel: None,
        })
    }

    /// Skip edges for which `predicate` returns `true`.
    ///
    /// Combined with `avoid_edge_query` by logical or.
    pub fn avoid_edges<P>(mut self, predicate: P) -> Self
    where
        P: EdgePredicate + 'g,
    {
        self.edge_predicate = Some(Box::new(predicate));
        self
    }

    /// Check `token` once per dequeued frontier entry.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The options this search runs with.
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Search from `start` for facilities of the given types.
    ///
    /// Returns records in discovery order.
    ///
    /// # Errors
    ///
    /// - [`CprnError::VertexNotFound`] if `start` is not in the graph
    /// - [`CprnError::GraphIntegrity`] if a neighbor or connecting edge is missing
    /// - the edge predicate's own error, unchanged
    /// - [`CprnError::Cancelled`] if the cancel token fires
    pub fn run<I, S>(&self, start: &str, facility_types: I) -> Result<Vec<SearchRecord>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target_types: BTreeSet<String> = facility_types.into_iter().map(Into::into).collect();
        let matcher = FacilityMatcher::new(&target_types, &self.options.avoid_facility_codes);
        let verbose = self.options.verbose;
        let max_depth = self.options.max_depth;
        let direction = self.options.direction;

        debug!(
            "Facility search from {start}: types={target_types:?}, direction={direction}, max_depth={max_depth}, max_distance={:?}",
            self.options.max_distance
        );

        let start_vertex = self.graph.vertex(start)?;
        let mut visited_vertices: HashSet<VertexId> = HashSet::new();
        let mut visited_facilities: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        let seed = FrontierEntry::seed(start);
        for facility in matcher.matching(start_vertex) {
            if visited_facilities.insert(facility.code.clone()) {
                step!(verbose, "start vertex {start} hosts facility {} ({})", facility.code, facility.fac_type);
                records.push(seed.record(start, Some(facility)));
            }
        }

        visited_vertices.insert(start.to_string());
        let mut queue = VecDeque::from([seed]);

        while let Some(mut entry) = queue.pop_front() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                debug!("Facility search from {start} cancelled with {} record(s)", records.len());
                return Err(CprnError::Cancelled {
                    records: records.len(),
                });
            }

            if entry.depth > max_depth {
                step!(verbose, "depth {} exceeds max_depth {max_depth} at {}", entry.depth, entry.vertex);
                continue;
            }

            if let Some(max_distance) = self.options.max_distance {
                if entry.cumulative_weight > max_distance {
                    step!(
                        verbose,
                        "distance {} exceeds max_distance {max_distance} at {}",
                        entry.cumulative_weight,
                        entry.vertex
                    );
                    if self.options.mark_distance_exhausted {
                        let mut marker = entry.record(start, None);
                        marker.reached_max_distance = true;
                        records.push(marker);
                    }
                    continue;
                }
            }

            let vertex = self
                .graph
                .vertex(&entry.vertex)
                .map_err(|e| dangling(&entry.vertex, e))?;

            let fresh: Vec<&Facility> = matcher
                .matching(vertex)
                .into_iter()
                .filter(|f| visited_facilities.insert(f.code.clone()))
                .collect();

            if !fresh.is_empty() {
                entry.depth += 1;
                let over_depth = entry.depth > max_depth;
                for (i, facility) in fresh.into_iter().enumerate() {
                    step!(
                        verbose,
                        "facility {} ({}, {}) found at {} depth {}",
                        facility.code,
                        facility.name,
                        facility.fac_type,
                        entry.vertex,
                        entry.depth
                    );
                    let mut record = entry.record(start, Some(facility));
                    record.reached_max_depth = over_depth;
                    records.push(record);
                    if i == 0 {
                        entry.reset_interval();
                    }
                }
            }

            // Over-depth matches still claim their neighbors; those entries
            // are dropped by the depth check when dequeued.

            let neighbors = self
                .graph
                .neighbors(&entry.vertex, direction)
                .map_err(|e| dangling(&entry.vertex, e))?;
            for neighbor in neighbors {
                if !visited_vertices.insert(neighbor.clone()) {
                    continue;
                }
                let edge = self
                    .graph
                    .connecting_edge(&entry.vertex, neighbor, direction)
                    .map_err(|e| dangling(&entry.vertex, e))?;
                if self.is_avoided(edge)? {
                    step!(verbose, "avoid edge {} -> {}", edge.source_id, edge.target_id);
                    continue;
                }
                queue.push_back(entry.advance(
                    neighbor,
                    edge.weight(),
                    edge.edge_code(&self.options.edge_code_attr),
                ));
            }
        }

        debug!(
            "Facility search from {start} finished: {} record(s), {} vertices reached",
            records.len(),
            visited_vertices.len()
        );
        Ok(records)
    }

    fn is_avoided(&self, edge: &Edge) -> Result<bool> {
        if let Some(query) = &self.edge_query {
            if query.should_avoid(&edge.properties)? {
                return Ok(true);
            }
        }
        match &self.edge_predicate {
            Some(predicate) => predicate.should_avoid(&edge.properties),
            None => Ok(false),
        }
    }
}

/// Lookup misses during traversal mean the graph references something it
/// does not contain.
fn dangling(at: &str, err: CprnError) -> CprnError {
    match err {
        CprnError::VertexNotFound { .. } | CprnError::EdgeNotFound { .. } => CprnError::GraphIntegrity {
            message: format!("while expanding {at}: {err}"),
        },
        other => other,
    }
}

/// Run a facility search with options only (no closure predicate).
///
/// # Errors
///
/// See [`FacilitySearch::new`] and [`FacilitySearch::run`].
pub fn search<G, I, S>(graph: &G, start: &str, facility_types: I, options: SearchOptions) -> Result<Vec<SearchRecord>>
where
    G: RoadGraph + ?Sized,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FacilitySearch::new(graph, options)?.run(start, facility_types)
}
