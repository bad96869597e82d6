//! Bounded facility search over a road network.
//!
//! - [`FacilitySearch`] / [`search`]: the breadth-first traversal
//! - [`SearchOptions`]: every recognized option, serde-configurable
//! - [`EdgePredicate`]: caller-supplied edge avoidance
//! - [`SearchRecord`]: ordered output, flattened with [`interval_table`]

mod engine;
mod interval;
mod matching;
mod options;
mod predicate;
mod record;

pub use engine::{search, FacilitySearch};
pub use interval::{interval_table, IntervalRow};
pub use matching::FacilityMatcher;
pub use options::{CancelToken, SearchOptions, DEFAULT_MAX_DEPTH};
pub use predicate::{avoid_when, EdgePredicate};
pub use record::SearchRecord;
