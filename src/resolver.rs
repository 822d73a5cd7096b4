//! The attribute resolver: the injected policy that reads a single
//! named member from a host value.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::trace;

use crate::value::{Member, Value};

/// What resolving one attribute off a host value yielded, preserving
/// whether the member was a single scalar or a sequence. The expander's
/// terminal step needs to know which, since the filter algebra treats a
/// sequence-valued group differently per operator (see
/// [`crate::expand::Group`]).
pub enum Resolved {
    /// No data member by that name, under the resolver's case policy,
    /// or the member was a bare callable.
    Missing,
    Scalar(Value),
    Sequence(Box<dyn Iterator<Item = Value>>),
}

impl Resolved {
    /// Collapses to a flat iterator, used when walking a non-terminal
    /// path segment: a scalar contributes one value to the frontier, a
    /// sequence fans out all of its values, and a missing member
    /// contributes none.
    pub fn into_values(self) -> Box<dyn Iterator<Item = Value>> {
        match self {
            Resolved::Missing => Box::new(std::iter::empty()),
            Resolved::Scalar(v) => Box::new(std::iter::once(v)),
            Resolved::Sequence(it) => it,
        }
    }
}

/// Reads a single attribute off a host value, yielding 0..N values.
///
/// Implementations may plug in a different attribute-name convention
/// than the default lowercase fold (e.g. camelCase hosts, or a
/// prefixed convention); the engine never inspects host types itself.
pub trait AttributeResolver: Send + Sync {
    fn resolve(&self, value: Value, name: &str) -> Resolved;
}

/// The default policy: both the queried name and the host's own field
/// names are folded to lowercase before comparison. Since Rust cannot
/// enumerate a host's fields at runtime, the fold is realized by
/// lowercasing the queried name before calling [`HostValue::field`].
/// Host implementations are expected to match on already-lowercase
/// field names, which is the Rust-shim half of the lowercase-fold
/// contract.
///
/// [`HostValue::field`]: crate::value::HostValue::field
#[derive(Debug, Default, Clone, Copy)]
pub struct LowercaseAttributeResolver;

impl AttributeResolver for LowercaseAttributeResolver {
    fn resolve(&self, value: Value, name: &str) -> Resolved {
        let host = match value {
            Value::Object(host) => host,
            // Scalars, lists, and everything else carry no named
            // members; missing-intermediate traversal is always safe.
            _ => return Resolved::Missing,
        };
        let normalized = name.to_lowercase();

        // A host's field() is ordinary code outside this crate; a
        // panic there must not unwind through the engine. Any failure
        // raised while reading is converted to an empty resolution.
        let member = catch_unwind(AssertUnwindSafe(|| host.field(&normalized)))
            .unwrap_or(Member::Missing);

        match member {
            Member::Missing => {
                trace!(attribute = %normalized, "member missing");
                Resolved::Missing
            }
            Member::Callable => {
                trace!(attribute = %normalized, "member is callable, refusing to invoke");
                Resolved::Missing
            }
            Member::Scalar(v) => Resolved::Scalar(v),
            Member::Sequence(it) => Resolved::Sequence(it),
        }
    }
}
