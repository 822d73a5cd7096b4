//! The filter algebra: a tree of filter nodes, each exposing
//! `matches(root) -> bool`.

pub mod operators;

use std::sync::Arc;

use regex::Regex;
use tracing::trace;

pub use operators::OpKind;

use crate::error::CompileError;
use crate::expand::{expand, expand_leaf_values};
use crate::path::Path;
use crate::resolver::AttributeResolver;
use crate::value::Value;

/// A compiled, immutable filter tree node. Modeled as one closed
/// discriminated union with match-based dispatch, rather than a class
/// hierarchy per operator.
pub enum FilterNode {
    BinaryOp {
        kind: OpKind,
        path: Path,
        literal: Value,
        regex: Option<Regex>,
        resolver: Arc<dyn AttributeResolver>,
    },
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
    Context {
        path: Path,
        resolver: Arc<dyn AttributeResolver>,
        child: Box<FilterNode>,
    },
}

impl std::fmt::Debug for FilterNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterNode::BinaryOp { kind, path, .. } => {
                write!(f, "BinaryOp({kind:?}, {path})")
            }
            FilterNode::And(children) => write!(f, "And({})", children.len()),
            FilterNode::Or(children) => write!(f, "Or({})", children.len()),
            FilterNode::Not(_) => write!(f, "Not(..)"),
            FilterNode::Context { path, .. } => write!(f, "Context({path}, ..)"),
        }
    }
}

impl FilterNode {
    /// Builds a binary operator node, compiling the regex eagerly for
    /// `OpKind::Regexp` (a malformed pattern is a construction-time
    /// error).
    pub fn binary(
        kind: OpKind,
        path: Path,
        literal: Value,
        resolver: Arc<dyn AttributeResolver>,
    ) -> Result<Self, CompileError> {
        let regex = if kind.is_regexp() {
            let pattern = literal
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| literal.to_string());
            Some(
                Regex::new(&pattern).map_err(|e| CompileError::BadRegex {
                    pattern,
                    message: e.to_string(),
                })?,
            )
        } else {
            None
        };
        Ok(FilterNode::BinaryOp {
            kind,
            path,
            literal,
            regex,
            resolver,
        })
    }

    pub fn and(children: Vec<FilterNode>) -> Result<Self, CompileError> {
        if children.is_empty() {
            return Err(CompileError::InvalidNumberOfOperands {
                operator: "AND".into(),
                expected: "at least 1".into(),
                got: 0,
            });
        }
        Ok(FilterNode::And(children))
    }

    pub fn or(children: Vec<FilterNode>) -> Result<Self, CompileError> {
        if children.is_empty() {
            return Err(CompileError::InvalidNumberOfOperands {
                operator: "OR".into(),
                expected: "at least 1".into(),
                got: 0,
            });
        }
        Ok(FilterNode::Or(children))
    }

    pub fn not(child: FilterNode) -> Self {
        FilterNode::Not(Box::new(child))
    }

    /// Builds a context node. `children` must contain exactly one
    /// filter; any other arity is a construction-time error.
    pub fn context(
        path: Path,
        mut children: Vec<FilterNode>,
        resolver: Arc<dyn AttributeResolver>,
    ) -> Result<Self, CompileError> {
        if children.len() != 1 {
            return Err(CompileError::InvalidNumberOfOperands {
                operator: "Context".into(),
                expected: "exactly 1 child filter".into(),
                got: children.len(),
            });
        }
        Ok(FilterNode::Context {
            path,
            resolver,
            child: Box::new(children.remove(0)),
        })
    }

    /// Evaluates this filter tree against `root`. Total: no data
    /// anomaly (missing attribute, uncomparable type, unreadable lazy
    /// sequence) ever causes this to raise.
    pub fn matches(&self, root: &Value) -> bool {
        match self {
            FilterNode::BinaryOp {
                kind,
                path,
                literal,
                regex,
                resolver,
            } => {
                for group in expand(resolver.as_ref(), root.clone(), path) {
                    if operators::apply_group(*kind, group, literal, regex.as_ref()) {
                        return true;
                    }
                }
                false
            }
            FilterNode::And(children) => children.iter().all(|c| c.matches(root)),
            FilterNode::Or(children) => children.iter().any(|c| c.matches(root)),
            FilterNode::Not(child) => !child.matches(root),
            FilterNode::Context {
                path,
                resolver,
                child,
            } => {
                for sub in expand_leaf_values(resolver.as_ref(), root.clone(), path) {
                    if child.matches(&sub) {
                        return true;
                    }
                }
                trace!(path = %path, "context produced no matching sub-object");
                false
            }
        }
    }
}
