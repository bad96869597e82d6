//! Evaluation of parsed expressions against an edge property map.
//!
//! Values follow dynamic-language conventions: booleans compare equal to
//! the integers 0 and 1, empty strings and lists are falsy, `None` only
//! equals `None`, and ordering between unrelated types is an error.

use super::parser::{CmpOp, Expr};
use crate::error::{CprnError, Result};
use crate::network::{PropertyMap, PropertyValue};
use std::cmp::Ordering;

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Value>),
    None,
}

impl Value {
    pub(crate) fn truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::List(items) => !items.is_empty(),
            Value::None => false,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "str",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::None => "NoneType",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::None, Value::None) => true,
            (Value::List(a), Value::List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y)),
            (Value::Int(a), Value::Int(b)) => a == b,
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    fn order(&self, other: &Value) -> Result<Option<Ordering>> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::Int(a), Value::Int(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.equals(y) {
                        return x.order(y);
                    }
                }
                Ok(Some(a.len().cmp(&b.len())))
            }
            _ => match (self.as_number(), other.as_number()) {
                // NaN yields None, which makes every ordering false
                (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
                _ => Err(type_error(format!(
                    "'<' not supported between '{}' and '{}'",
                    self.type_name(),
                    other.type_name()
                ))),
            },
        }
    }

    fn contains(&self, needle: &Value) -> Result<bool> {
        match (self, needle) {
            (Value::List(items), _) => Ok(items.iter().any(|item| item.equals(needle))),
            (Value::Str(haystack), Value::Str(n)) => Ok(haystack.contains(n.as_str())),
            (Value::Str(_), other) => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
            (other, _) => Err(type_error(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        }
    }
}

impl From<&PropertyValue> for Value {
    fn from(value: &PropertyValue) -> Self {
        match value {
            PropertyValue::String(s) => Value::Str(s.clone()),
            PropertyValue::Int(i) => Value::Int(*i),
            PropertyValue::Float(f) => Value::Float(*f),
            PropertyValue::Bool(b) => Value::Bool(*b),
            PropertyValue::StringList(items) => Value::List(items.iter().cloned().map(Value::Str).collect()),
            PropertyValue::IntList(items) => Value::List(items.iter().copied().map(Value::Int).collect()),
            PropertyValue::Null => Value::None,
        }
    }
}

fn type_error(message: String) -> CprnError {
    CprnError::Predicate { message, source: None }
}

pub(crate) fn evaluate(expr: &Expr, props: &PropertyMap) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => Ok(props.get(name).map(Value::from).unwrap_or(Value::None)),
        Expr::List(items) => Ok(Value::List(
            items.iter().map(|item| evaluate(item, props)).collect::<Result<_>>()?,
        )),
        Expr::Not(inner) => Ok(Value::Bool(!evaluate(inner, props)?.truthy())),
        Expr::And(terms) => {
            let mut last = Value::Bool(true);
            for term in terms {
                last = evaluate(term, props)?;
                if !last.truthy() {
                    break;
                }
            }
            Ok(last)
        }
        Expr::Or(terms) => {
            let mut last = Value::Bool(false);
            for term in terms {
                last = evaluate(term, props)?;
                if last.truthy() {
                    break;
                }
            }
            Ok(last)
        }
        Expr::Compare { first, rest } => {
            let mut left = evaluate(first, props)?;
            for (op, right_expr) in rest {
                let right = evaluate(right_expr, props)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool> {
    Ok(match op {
        CmpOp::Eq => left.equals(right),
        CmpOp::Ne => !left.equals(right),
        CmpOp::Lt => left.order(right)? == Some(Ordering::Less),
        CmpOp::Le => matches!(left.order(right)?, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => left.order(right)? == Some(Ordering::Greater),
        CmpOp::Ge => matches!(left.order(right)?, Some(Ordering::Greater | Ordering::Equal)),
        CmpOp::In => right.contains(left)?,
        CmpOp::NotIn => !right.contains(left)?,
    })
}
