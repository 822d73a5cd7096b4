//! The value expander: walks a dotted path across the object graph,
//! fanning out through repeated intermediate members, and yields the
//! *value groups* reached at the terminal segment.

use crate::path::Path;
use crate::resolver::{AttributeResolver, Resolved};
use crate::value::Value;

/// The terminal value of one traversal path through the object graph.
///
/// A non-repeated, scalar-valued leaf produces [`Group::Value`]
/// directly. A leaf whose member is itself a sequence, eager or lazy,
/// produces [`Group::Sequence`] rather than being flattened into one
/// group per element: a group is yielded whole and is never flattened
/// further, since it may itself be a lazy sequence. It is up to each
/// operator to decide how to treat a sequence-valued group
/// (`Contains`/`InSet` look inside it; `Regexp` never matches it; the
/// rest materialize it into a [`Value::List`] via [`Group::into_value`]
/// before comparing).
pub enum Group<'r> {
    Value(Value),
    Sequence(Box<dyn Iterator<Item = Value> + 'r>),
}

impl<'r> Group<'r> {
    /// Materializes a sequence group into a single [`Value::List`]; a
    /// scalar group passes through unchanged. Used by every binary
    /// operator except `Contains`/`NotContains` (which can short-circuit
    /// over a lazy sequence without collecting it) and `Regexp` (which
    /// never matches a sequence and so never needs to drain one).
    pub fn into_value(self) -> Value {
        match self {
            Group::Value(v) => v,
            Group::Sequence(it) => Value::List(it.collect()),
        }
    }
}

/// A lazy sequence of groups, single-use and single-pass per call.
pub type GroupSeq<'r> = Box<dyn Iterator<Item = Group<'r>> + 'r>;

/// Expands `path` from `root`, using `resolver` to read each attribute.
///
/// Non-terminal segments are materialized one level at a time (each
/// repeated member forks the frontier); the terminal segment is left
/// lazy, since an operator may short-circuit before consuming it.
pub fn expand<'r>(resolver: &'r dyn AttributeResolver, root: Value, path: &Path) -> GroupSeq<'r> {
    let segments = path.segments();
    if segments.is_empty() {
        return Box::new(std::iter::empty());
    }

    let mut frontier = vec![root];
    for segment in &segments[..segments.len() - 1] {
        let mut next = Vec::new();
        for value in frontier {
            next.extend(resolver.resolve(value, segment).into_values());
        }
        if next.is_empty() {
            // A missing (or non-data) intermediate member terminates
            // expansion with no groups, never an error.
            return Box::new(std::iter::empty());
        }
        frontier = next;
    }

    let last = segments[segments.len() - 1].clone();
    Box::new(
        frontier
            .into_iter()
            .filter_map(move |value| match resolver.resolve(value, &last) {
                Resolved::Missing => None,
                Resolved::Scalar(v) => Some(Group::Value(v)),
                Resolved::Sequence(it) => Some(Group::Sequence(it)),
            }),
    )
}

/// Flattens all groups down to individual values. Used by the
/// [`Context`](crate::filter::FilterNode::Context) operator, which
/// rebinds its child filter to each sub-object in turn rather than to
/// whole groups.
pub fn expand_leaf_values<'r>(
    resolver: &'r dyn AttributeResolver,
    root: Value,
    path: &Path,
) -> Box<dyn Iterator<Item = Value> + 'r> {
    Box::new(expand(resolver, root, path).flat_map(|group| match group {
        Group::Value(v) => Box::new(std::iter::once(v)) as Box<dyn Iterator<Item = Value>>,
        Group::Sequence(it) => it,
    }))
}
