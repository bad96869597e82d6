//! Edge filter expressions.
//!
//! A small boolean expression language evaluated against an edge's
//! properties, used for `avoid_edge_query`:
//!
//! ```text
//! road_class in ['motorway', 'trunk'] or (lanes < 2 and not paved)
//! ```
//!
//! Supported: `or`, `and`, `not`, the comparisons `== != < > <= >=`
//! (chainable, as in `1 < lanes <= 3`), `in` / `not in` over lists and
//! substrings, quoted strings, integers, floats, `True`, `False`, `None`
//! and list literals. Identifiers name edge properties; an absent property
//! evaluates to `None`.

mod eval;
mod lexer;
mod parser;

use crate::error::{CprnError, Result};
use crate::network::PropertyMap;
use crate::search::EdgePredicate;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// A compiled edge filter expression.
///
/// ```
/// use cprn::{EdgeQuery, PropertyMap};
///
/// let query = EdgeQuery::parse("lanes < 2 or surface == 'gravel'")?;
/// let edge = PropertyMap::new().with("lanes", 1i64);
/// assert!(query.matches(&edge)?);
/// # Ok::<(), cprn::CprnError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EdgeQuery {
    source: String,
    expr: parser::Expr,
    lenient: bool,
}

impl EdgeQuery {
    /// Parse an expression. Syntax errors report the byte offset.
    pub fn parse(source: &str) -> Result<Self> {
        let expr = parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            expr,
            lenient: false,
        })
    }

    /// Treat evaluation errors (such as ordering a string against a number)
    /// as a non-match instead of failing.
    pub fn lenient(mut self) -> Self {
        self.lenient = true;
        self
    }

    /// Whether evaluation errors are swallowed.
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    /// Evaluate strictly: type errors are returned as
    /// [`CprnError::Predicate`] whatever the leniency setting.
    pub fn evaluate(&self, props: &PropertyMap) -> Result<bool> {
        eval::evaluate(&self.expr, props)
            .map(|value| value.truthy())
            .map_err(|err| match err {
                CprnError::Predicate { message, source } => CprnError::Predicate {
                    message: format!("{message} in `{}`", self.source),
                    source,
                },
                other => other,
            })
    }

    /// Evaluate, honouring the leniency setting.
    pub fn matches(&self, props: &PropertyMap) -> Result<bool> {
        match self.evaluate(props) {
            Err(CprnError::Predicate { message, .. }) if self.lenient => {
                debug!("Edge query treated as non-match: {message}");
                Ok(false)
            }
            other => other,
        }
    }

    /// The expression text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl EdgePredicate for EdgeQuery {
    fn should_avoid(&self, props: &PropertyMap) -> Result<bool> {
        self.matches(props)
    }
}

impl FromStr for EdgeQuery {
    type Err = CprnError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EdgeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
