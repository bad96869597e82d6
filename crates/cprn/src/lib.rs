//! # cprn
//!
//! Facility topology search over a preprocessed road-refline network.
//!
//! Given a start vertex and a set of facility types (fuel stations, toll
//! gates, service areas...), the search walks the network breadth-first,
//! downstream or upstream, and reports every facility it reaches together
//! with the traversal metadata of the branch that found it: depth in facility
//! matches, interval and cumulative weights, and the edge codes traversed.
//!
//! ## Core Principles
//!
//! - **Bounded**: depth counts facility matches, distance counts edge weight
//! - **Deterministic**: FIFO discovery order, insertion-ordered adjacency
//! - **Fail Fast**: a search returns all its records or an error
//! - **Read-only Graphs**: concurrent searches share a network without locks
//!
//! ## Architecture
//!
//! ```text
//! Export (CSV, JSON) / Interval table
//!     ↓
//! Facility Search (BFS engine, options, avoidance)
//!     ↓
//! Road Network (vertices, facilities, edges, queries)
//!     ↓
//! Persistence (signed archive, storage backends)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cprn::{search, Facility, PropertyMap, RoadNetwork, SearchOptions, Vertex};
//!
//! let mut network = RoadNetwork::new();
//! network.add_vertex(Vertex::new("wtw3sjq6q8ke"))?;
//! network.add_vertex(
//!     Vertex::new("wtw3sjq6qbzz").with_facility(Facility::new("G001", "fuel", "Station A")),
//! )?;
//! network.add_edge("wtw3sjq6q8ke", "wtw3sjq6qbzz", PropertyMap::new().with("weight", 1.2))?;
//!
//! let records = search(&network, "wtw3sjq6q8ke", ["fuel"], SearchOptions::default())?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].facility_code(), Some("G001"));
//! # Ok::<(), cprn::CprnError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod archive;
pub mod error;
pub mod export;
pub mod expr;
pub mod geohash;
pub mod network;
pub mod search;
pub mod storage;

// Re-export main types
pub use error::{CprnError, Result};
pub use expr::EdgeQuery;
pub use network::{
    Direction, Edge, Facility, FacilityQuery, FacilityRef, NetworkSnapshot, PropertyMap,
    PropertyValue, RoadGraph, RoadNetwork, Vertex, VertexId,
};
pub use search::{
    avoid_when, interval_table, search, CancelToken, EdgePredicate, FacilitySearch, IntervalRow,
    SearchOptions, SearchRecord,
};
#[cfg(feature = "rocksdb-backend")]
pub use storage::RocksDBBackend;
pub use storage::{MemoryBackend, StorageBackend};
