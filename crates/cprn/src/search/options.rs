//! Search configuration.

use crate::error::{CprnError, Result};
use crate::network::{Direction, DEFAULT_EDGE_CODE_ATTR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default facility-match depth budget.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Every option recognized by the facility search.
///
/// Deserializing rejects unknown keys, so a misspelled option in a JSON
/// configuration fails at construction instead of being ignored.
///
/// # Examples
///
/// ```
/// use cprn::{Direction, SearchOptions};
///
/// let opts = SearchOptions::default()
///     .with_direction(Direction::Upstream)
///     .with_max_depth(2)
///     .with_max_distance(25_000.0)
///     .avoid_facility_code("S0042");
/// assert_eq!(opts.max_depth, 2);
///
/// let from_json = SearchOptions::from_json(r#"{"direction": "upstream", "max_depth": 2}"#).unwrap();
/// assert_eq!(from_json.direction, Direction::Upstream);
/// assert!(SearchOptions::from_json(r#"{"max_dist": 10}"#).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOptions {
    /// Follow successors (`downstream`) or predecessors (`upstream`)
    pub direction: Direction,
    /// Maximum number of facility matches along a branch
    pub max_depth: u32,
    /// Maximum cumulative edge weight; `None` is unbounded
    pub max_distance: Option<f64>,
    /// Emit a marker record where a branch runs out of distance
    pub mark_distance_exhausted: bool,
    /// Facility codes never reported
    pub avoid_facility_codes: BTreeSet<String>,
    /// Edge expression; edges for which it holds are not traversed
    pub avoid_edge_query: Option<String>,
    /// Edge property holding the edge code
    pub edge_code_attr: String,
    /// Log every traversal step at info level instead of trace
    pub verbose: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Downstream,
            max_depth: DEFAULT_MAX_DEPTH,
            max_distance: None,
            mark_distance_exhausted: false,
            avoid_facility_codes: BTreeSet::new(),
            avoid_edge_query: None,
            edge_code_attr: DEFAULT_EDGE_CODE_ATTR.to_string(),
            verbose: false,
        }
    }
}

impl SearchOptions {
    /// Parse options from JSON; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidArgument`] for unknown keys, an unknown
    /// direction, mistyped values, or values rejected by [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let options: SearchOptions = serde_json::from_str(json)
            .map_err(|e| CprnError::invalid_argument(format!("search options: {e}")))?;
        options.validate()?;
        Ok(options)
    }

    /// Check option values that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidArgument`] for a NaN or negative distance
    /// budget or an empty edge code attribute name.
    pub fn validate(&self) -> Result<()> {
        if let Some(max) = self.max_distance {
            if max.is_nan() || max < 0.0 {
                return Err(CprnError::invalid_argument(format!(
                    "max_distance must be a non-negative number, got {max}"
                )));
            }
        }
        if self.edge_code_attr.is_empty() {
            return Err(CprnError::invalid_argument("edge_code_attr must not be empty"));
        }
        Ok(())
    }

    /// Set the traversal direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the traversal direction from its name.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::InvalidArgument`] unless `name` is `downstream` or `upstream`.
    pub fn with_direction_name(mut self, name: &str) -> Result<Self> {
        self.direction = name.parse()?;
        Ok(self)
    }

    /// Set the facility-match depth budget.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Bound the cumulative edge weight.
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Emit markers where branches run out of distance.
    pub fn with_mark_distance_exhausted(mut self, mark: bool) -> Self {
        self.mark_distance_exhausted = mark;
        self
    }

    /// Never report the facility with this code.
    pub fn avoid_facility_code(mut self, code: impl Into<String>) -> Self {
        self.avoid_facility_codes.insert(code.into());
        self
    }

    /// Never report any of these facility codes.
    pub fn avoid_facility_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_facility_codes.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Skip edges matching this expression (see [`EdgeQuery`](crate::expr::EdgeQuery)).
    pub fn with_avoid_edge_query(mut self, query: impl Into<String>) -> Self {
        self.avoid_edge_query = Some(query.into());
        self
    }

    /// Read edge codes from a different edge property.
    pub fn with_edge_code_attr(mut self, attr: impl Into<String>) -> Self {
        self.edge_code_attr = attr.into();
        self
    }

    /// Log each traversal step at info level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Cooperative cancellation flag checked once per dequeued frontier entry.
///
/// Clones share the flag, so one clone can be handed to the search and
/// another kept by the caller (or another thread) to cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SearchOptions::default();
        assert_eq!(opts.direction, Direction::Downstream);
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.max_distance, None);
        assert!(!opts.mark_distance_exhausted);
        assert_eq!(opts.edge_code_attr, "edge_code");
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let opts = SearchOptions::from_json(
            r#"{"max_distance": 120.5, "avoid_facility_codes": ["A", "B"], "avoid_edge_query": "lane < 2"}"#,
        )
        .unwrap();
        assert_eq!(opts.max_distance, Some(120.5));
        assert_eq!(opts.avoid_facility_codes.len(), 2);
        assert_eq!(opts.max_depth, 3);
        assert_eq!(opts.avoid_edge_query.as_deref(), Some("lane < 2"));
    }

    #[test]
    fn test_from_json_rejects_unknown_option() {
        let err = SearchOptions::from_json(r#"{"max_dist": 10}"#).unwrap_err();
        assert!(matches!(err, CprnError::InvalidArgument { .. }));
    }

    #[test]
    fn test_from_json_rejects_bad_direction() {
        let err = SearchOptions::from_json(r#"{"direction": "both"}"#).unwrap_err();
        assert!(matches!(err, CprnError::InvalidArgument { .. }));
    }

    #[test]
    fn test_validate_rejects_negative_distance() {
        let opts = SearchOptions::default().with_max_distance(-1.0);
        assert!(opts.validate().is_err());
        let opts = SearchOptions::default().with_max_distance(f64::NAN);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_direction_name() {
        assert!(SearchOptions::default().with_direction_name("upstream").is_ok());
        assert!(SearchOptions::default().with_direction_name("Upstream").is_err());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
