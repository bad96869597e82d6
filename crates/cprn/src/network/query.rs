//! Fluent queries over the facilities hosted by a network.

use super::property::PropertyValue;
use super::roadnet::{FacilityRef, RoadNetwork};
use super::types::Facility;

/// A filter predicate applied to (hosting vertex, facility) pairs.
type FilterFn<'a> = Box<dyn Fn(&str, &Facility) -> bool + 'a>;

/// Fluent query builder over hosted facilities.
///
/// # Examples
///
/// ```
/// use cprn::{Facility, RoadNetwork, Vertex};
///
/// # fn example() -> cprn::Result<()> {
/// let mut net = RoadNetwork::new();
/// net.add_vertex(Vertex::new("wtw3sjq6q0x1").with_facility(Facility::new("S1", "service", "Meishan")))?;
///
/// let services = net.facilities()
///     .fac_type("service")
///     .within_geohash("wtw3")
///     .execute();
/// assert_eq!(services.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct FacilityQuery<'a> {
    network: &'a RoadNetwork,
    filters: Vec<FilterFn<'a>>,
    limit_value: Option<usize>,
}

impl<'a> FacilityQuery<'a> {
    /// Create a new query over the given network.
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self {
            network,
            filters: Vec::new(),
            limit_value: None,
        }
    }

    /// Filter by exact facility type.
    pub fn fac_type(mut self, fac_type: &str) -> Self {
        let fac_type = fac_type.to_string();
        self.filters.push(Box::new(move |_, f| f.fac_type == fac_type));
        self
    }

    /// Filter by exact facility code.
    pub fn code(mut self, code: &str) -> Self {
        let code = code.to_string();
        self.filters.push(Box::new(move |_, f| f.code == code));
        self
    }

    /// Filter by name containing a substring (case-insensitive).
    pub fn name_contains(mut self, substring: &str) -> Self {
        let substring = substring.to_lowercase();
        self.filters
            .push(Box::new(move |_, f| f.name.to_lowercase().contains(&substring)));
        self
    }

    /// Filter by exact auxiliary attribute match.
    pub fn property<V: Into<PropertyValue>>(mut self, key: &str, value: V) -> Self {
        let key = key.to_string();
        let value = value.into();
        self.filters.push(Box::new(move |_, f| {
            match (f.attributes.get(&key), &value) {
                (Some(PropertyValue::Float(a)), PropertyValue::Float(b)) => (a - b).abs() < f64::EPSILON,
                (Some(found), wanted) => found == wanted,
                (None, _) => false,
            }
        }));
        self
    }

    /// Keep facilities whose hosting vertex geohash starts with `prefix`.
    pub fn within_geohash(mut self, prefix: &str) -> Self {
        let prefix = prefix.to_string();
        self.filters.push(Box::new(move |vertex_id, _| vertex_id.starts_with(&prefix)));
        self
    }

    /// Filter using a custom predicate.
    pub fn custom<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &Facility) -> bool + 'a,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Limit the number of results returned.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit_value = Some(n);
        self
    }

    /// Execute the query, returning matches in vertex then facility order.
    pub fn execute(&self) -> Vec<FacilityRef<'a>> {
        let limit = self.limit_value.unwrap_or(usize::MAX);
        self.matching().take(limit).collect()
    }

    /// Count matching facilities.
    pub fn count(&self) -> usize {
        self.matching().count()
    }

    /// Check if any facility matches (short-circuits on first match).
    pub fn exists(&self) -> bool {
        self.matching().next().is_some()
    }

    fn matching(&self) -> impl Iterator<Item = FacilityRef<'a>> + '_ {
        let network: &'a RoadNetwork = self.network;
        network
            .facility_vertices()
            .flat_map(|v| {
                v.facilities().iter().map(move |f| FacilityRef {
                    vertex_id: v.id.as_str(),
                    facility: f,
                })
            })
            .filter(move |r| self.filters.iter().all(|filter| filter(r.vertex_id, r.facility)))
    }
}
