//! The data model the expander and filter algebra operate on: host
//! values, the members a host value can expose, and the terminal
//! [`Value`] type comparisons are made against.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A value reached by expansion, or supplied as a query literal.
///
/// `Object` is a nested host value reached mid-path (never a terminal
/// comparison target in the worked examples, but required so the
/// [`Context`](crate::filter::FilterNode::Context) operator has
/// something to re-root onto). `List` is an eager list: either a query
/// literal (`a inset [1, 2, 3]`) or a host member that returns "a list"
/// as a single atomic value rather than fanning out (see
/// `DummyFile.attributes` in the fixture: a non-repeated property whose
/// value happens to be a list is still one group).
#[derive(Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Object(Rc<dyn HostValue>),
    List(Vec<Value>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Integer(n) => write!(f, "Integer({n})"),
            Value::Float(n) => write!(f, "Float({n})"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Object(_) => write!(f, "Object(..)"),
            Value::List(items) => write!(f, "List({items:?})"),
        }
    }
}

impl fmt::Display for Value {
    /// Used by the `Regexp` operator, which matches against a string or
    /// a stringified number. Adopts Rust's default numeric formatting
    /// for the stringification.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Object(_) => write!(f, "<object>"),
            Value::List(_) => write!(f, "<list>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
            (List(a), List(b)) => a == b,
            (Object(a), Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Numeric value if this is an `Integer` or `Float`, for the
    /// ordering operators and cross-type numeric equality.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Total order comparison for the `Less`/`LessEqual`/`Greater`/
    /// `GreaterEqual` operators. `None` when the pair is not
    /// comparable (e.g. a string against a number, or anything against
    /// an object or a list). Callers treat `None` as "does not match",
    /// never as an error.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }
}

/// What resolving a single attribute name against a host value can
/// yield.
pub enum Member {
    /// No data member by that name, under the resolver's case policy.
    Missing,
    /// The member exists but is a bare callable; the engine refuses to
    /// invoke it.
    Callable,
    /// A scalar or composite value. Contributes exactly one value.
    Scalar(Value),
    /// An eager or lazy sequence, consumed in declaration order.
    Sequence(Box<dyn Iterator<Item = Value>>),
}

/// An opaque host object the engine inspects only through `field`.
///
/// Rust has no runtime field reflection, so hosts implement this shim
/// directly. The default [`crate::resolver::LowercaseAttributeResolver`]
/// lowercases the queried name before calling it; well-behaved
/// implementations should match on lowercase field names so the
/// lowercase-fold contract actually holds.
pub trait HostValue: fmt::Debug {
    fn field(&self, name: &str) -> Member;
}
