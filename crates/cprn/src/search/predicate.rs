//! Edge-avoidance predicates.

use crate::error::Result;
use crate::network::PropertyMap;

/// Decides whether the search must not traverse an edge.
///
/// The search treats implementations as opaque: it hands over the edge's
/// attribute map and propagates any error unchanged. Implemented for
/// closures and for compiled [`EdgeQuery`](crate::expr::EdgeQuery) expressions.
pub trait EdgePredicate {
    /// `Ok(true)` if the edge must be skipped.
    fn should_avoid(&self, edge: &PropertyMap) -> Result<bool>;
}

impl<F> EdgePredicate for F
where
    F: Fn(&PropertyMap) -> Result<bool>,
{
    fn should_avoid(&self, edge: &PropertyMap) -> Result<bool> {
        self(edge)
    }
}

/// Predicate built from a plain boolean closure that cannot fail.
pub fn avoid_when<F>(f: F) -> impl EdgePredicate
where
    F: Fn(&PropertyMap) -> bool,
{
    move |edge: &PropertyMap| -> Result<bool> { Ok(f(edge)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CprnError;

    #[test]
    fn test_closure_predicate() {
        let avoid_ramps = |edge: &PropertyMap| -> Result<bool> { Ok(edge.get_bool("ramp") == Some(true)) };
        assert!(avoid_ramps.should_avoid(&PropertyMap::new().with("ramp", true)).unwrap());
        assert!(!avoid_ramps.should_avoid(&PropertyMap::new()).unwrap());
    }

    #[test]
    fn test_avoid_when() {
        let p = avoid_when(|edge| edge.get_int("lane").is_some_and(|l| l < 2));
        assert!(p.should_avoid(&PropertyMap::new().with("lane", 1i64)).unwrap());
        assert!(!p.should_avoid(&PropertyMap::new().with("lane", 3i64)).unwrap());
    }

    #[test]
    fn test_failing_predicate_surfaces_error() {
        let p = |_: &PropertyMap| -> Result<bool> {
            Err(CprnError::predicate("attribute service down", None::<std::io::Error>))
        };
        assert!(matches!(
            p.should_avoid(&PropertyMap::new()),
            Err(CprnError::Predicate { .. })
        ));
    }
}
