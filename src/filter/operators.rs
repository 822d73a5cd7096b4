//! `Operation` dispatch for each binary operator kind.

use regex::Regex;

use crate::expand::Group;
use crate::value::Value;

/// The closed set of binary comparison operators. Kept as a single
/// enum with a dispatch table on `kind`, rather than a hierarchy of
/// operator types, per the data model's tagged-variant design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Contains,
    NotContains,
    InSet,
    NotInSet,
    Regexp,
}

impl OpKind {
    /// Whether this operator's literal must be a list (`InSet`/
    /// `NotInSet`), as opposed to a scalar.
    pub fn takes_list_literal(self) -> bool {
        matches!(self, OpKind::InSet | OpKind::NotInSet)
    }

    pub fn is_regexp(self) -> bool {
        matches!(self, OpKind::Regexp)
    }
}

fn equals(v: &Value, literal: &Value) -> bool {
    v == literal
}

fn contains(v: &Value, literal: &Value) -> bool {
    match (v, literal) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::List(items), needle) => items.iter().any(|item| item == needle),
        _ => false,
    }
}

/// `v inset literal` where `literal` is always a list:
/// - if `v` is atomic, plain membership;
/// - if `v` is itself a list, every element of `v` must be in
///   `literal` (`v` is a subset of `literal`). An empty `v` is
///   vacuously a subset of anything.
fn in_set(v: &Value, literal_items: &[Value]) -> bool {
    match v {
        Value::List(items) => items
            .iter()
            .all(|item| literal_items.iter().any(|candidate| candidate == item)),
        atomic => literal_items.iter().any(|candidate| candidate == atomic),
    }
}

/// Applies `kind`'s `Operation` to one expanded [`Group`] against the
/// operator's literal, one call per group.
///
/// `Contains`/`NotContains` look inside a sequence-valued group without
/// materializing it (short-circuiting on the first member that matches);
/// `Regexp` never matches a sequence, so it skips materializing one
/// entirely; every other operator needs the group as one combined
/// [`Value`] (a list, if the group was a sequence) to compare as a
/// whole. This is required for `Equals`/`InSet`'s whole-collection
/// semantics, including the vacuous "`[]` is a subset of anything" case.
pub fn apply_group(kind: OpKind, group: Group, literal: &Value, regex: Option<&Regex>) -> bool {
    match kind {
        OpKind::Contains => contains_group(group, literal),
        OpKind::NotContains => !contains_group(group, literal),
        OpKind::Regexp => match group {
            Group::Value(v) => apply(kind, &v, literal, regex),
            Group::Sequence(_) => false,
        },
        _ => apply(kind, &group.into_value(), literal, regex),
    }
}

fn contains_group(group: Group, literal: &Value) -> bool {
    match group {
        Group::Value(v) => contains(&v, literal),
        Group::Sequence(mut it) => it.any(|item| &item == literal),
    }
}

/// Applies `kind`'s `Operation` to one flattened value `v` against the
/// operator's literal. `regex` is `Some` only for `OpKind::Regexp`,
/// precompiled at construction time.
pub fn apply(kind: OpKind, v: &Value, literal: &Value, regex: Option<&Regex>) -> bool {
    match kind {
        OpKind::Equals => equals(v, literal),
        OpKind::NotEquals => !equals(v, literal),
        OpKind::Less => matches!(v.partial_compare(literal), Some(std::cmp::Ordering::Less)),
        OpKind::LessEqual => matches!(
            v.partial_compare(literal),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),
        OpKind::Greater => matches!(v.partial_compare(literal), Some(std::cmp::Ordering::Greater)),
        OpKind::GreaterEqual => matches!(
            v.partial_compare(literal),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        OpKind::Contains => contains(v, literal),
        OpKind::NotContains => !contains(v, literal),
        OpKind::InSet => match literal.as_list() {
            Some(items) => in_set(v, items),
            None => false,
        },
        OpKind::NotInSet => match literal.as_list() {
            Some(items) => !in_set(v, items),
            None => false,
        },
        OpKind::Regexp => {
            let Some(regex) = regex else { return false };
            match v {
                Value::String(_) | Value::Integer(_) | Value::Float(_) => {
                    regex.is_match(&v.to_string())
                }
                _ => false,
            }
        }
    }
}
