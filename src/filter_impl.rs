//! The filter implementation registry and compiler: resolves a parse
//! tree's string operator keywords against a concrete
//! [`OpKind`](crate::filter::OpKind) table, links in the attribute
//! resolver, and produces an executable [`FilterNode`] tree.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::CompileError;
use crate::filter::{FilterNode, OpKind};
use crate::parser::{Literal, ParseNode, ScalarLiteral};
use crate::path::Path;
use crate::resolver::{AttributeResolver, LowercaseAttributeResolver};
use crate::token::AndOr;
use crate::value::Value;

/// A lookup from lowercase operator keyword to the [`OpKind`] it
/// invokes, bundled with the attribute-resolution policy to use while
/// compiling and evaluating the resulting filter tree.
#[derive(Clone)]
pub struct FilterImplementation {
    operators: HashMap<&'static str, OpKind>,
    resolver: Arc<dyn AttributeResolver>,
}

impl FilterImplementation {
    /// The built-in registry: every operator keyword the scanner
    /// recognises, paired with the default lowercase-fold resolver.
    pub fn lowercase() -> Self {
        FilterImplementation::with_resolver(Arc::new(LowercaseAttributeResolver))
    }

    /// Same built-in operator table, with a caller-supplied resolver
    /// policy, for hosts that use a different attribute-name convention.
    pub fn with_resolver(resolver: Arc<dyn AttributeResolver>) -> Self {
        let operators = HashMap::from([
            ("is", OpKind::Equals),
            ("==", OpKind::Equals),
            ("isnot", OpKind::NotEquals),
            ("!=", OpKind::NotEquals),
            ("<", OpKind::Less),
            ("<=", OpKind::LessEqual),
            (">", OpKind::Greater),
            (">=", OpKind::GreaterEqual),
            ("contains", OpKind::Contains),
            ("notcontains", OpKind::NotContains),
            ("inset", OpKind::InSet),
            ("notinset", OpKind::NotInSet),
            ("regexp", OpKind::Regexp),
        ]);
        FilterImplementation {
            operators,
            resolver,
        }
    }

    fn lookup(&self, keyword: &str) -> Result<OpKind, CompileError> {
        self.operators
            .get(keyword)
            .copied()
            .ok_or_else(|| CompileError::UnknownOperator(keyword.to_string()))
    }

    pub fn resolver(&self) -> Arc<dyn AttributeResolver> {
        Arc::clone(&self.resolver)
    }
}

/// Compiles a parse tree into an executable filter tree, resolving
/// operator keywords against `impl_` and linking the resolver into
/// every node that needs to expand a path at `matches` time.
pub fn compile(tree: &ParseNode, impl_: &FilterImplementation) -> Result<FilterNode, CompileError> {
    let node = compile_node(tree, impl_)?;
    debug!(?node, "query compiled");
    Ok(node)
}

fn compile_node(tree: &ParseNode, impl_: &FilterImplementation) -> Result<FilterNode, CompileError> {
    match tree {
        ParseNode::BinaryOp { path, op, arg } => {
            let kind = impl_.lookup(op)?;
            let literal = literal_value(arg);
            FilterNode::binary(kind, path.clone(), literal, impl_.resolver())
        }
        ParseNode::Context { path, child } => {
            let compiled_child = compile_node(child, impl_)?;
            FilterNode::context(path.clone(), vec![compiled_child], impl_.resolver())
        }
        ParseNode::Chain { first, rest } => compile_chain(first, rest, impl_),
    }
}

/// Folds a flat `AND`/`OR` chain into nested combinator nodes.
///
/// Consecutive expressions sharing the same connective are grouped into
/// a single flat `AndFilter`/`OrFilter` for the homogeneous case. A run
/// boundary where the connective switches is where nesting occurs, read
/// left to right, with no precedence between `AND` and `OR`.
fn compile_chain(
    first: &ParseNode,
    rest: &[(AndOr, ParseNode)],
    impl_: &FilterImplementation,
) -> Result<FilterNode, CompileError> {
    let mut groups: Vec<(Option<AndOr>, Vec<FilterNode>)> =
        vec![(None, vec![compile_node(first, impl_)?])];

    for (connective, expr) in rest {
        let compiled = compile_node(expr, impl_)?;
        let current_op = groups.last().unwrap().0;
        if current_op.is_none() || current_op == Some(*connective) {
            groups.last_mut().unwrap().0 = Some(*connective);
            groups.last_mut().unwrap().1.push(compiled);
        } else {
            groups.push((Some(*connective), vec![compiled]));
        }
    }

    let mut groups = groups.into_iter();
    // `rest` is non-empty (the parser never emits an empty `Chain`), so
    // the loop above always ran at least once and set this group's op.
    let (first_op, first_children) = groups.next().expect("at least one group");
    let mut acc = combine(first_op, first_children)?;

    for (op, children) in groups {
        let rhs = combine(op, children)?;
        acc = combine(op, vec![acc, rhs])?;
    }
    Ok(acc)
}

fn combine(op: Option<AndOr>, mut children: Vec<FilterNode>) -> Result<FilterNode, CompileError> {
    if children.len() == 1 {
        return Ok(children.remove(0));
    }
    match op {
        Some(AndOr::And) | None => FilterNode::and(children),
        Some(AndOr::Or) => FilterNode::or(children),
    }
}

fn literal_value(arg: &Literal) -> Value {
    match arg {
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
        Literal::List(items) => Value::List(items.iter().map(scalar_value).collect()),
    }
}

fn scalar_value(item: &ScalarLiteral) -> Value {
    match item {
        ScalarLiteral::Integer(n) => Value::Integer(*n),
        ScalarLiteral::Float(f) => Value::Float(*f),
        ScalarLiteral::String(s) => Value::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::value::{HostValue, Member};

    #[derive(Debug)]
    struct Simple(&'static str, Value);

    impl HostValue for Simple {
        fn field(&self, name: &str) -> Member {
            if name == self.0 {
                Member::Scalar(self.1.clone())
            } else {
                Member::Missing
            }
        }
    }

    fn root(v: Simple) -> Value {
        Value::Object(std::rc::Rc::new(v))
    }

    #[test]
    fn unknown_operator_is_a_compile_error() {
        // "regexp" is valid, but a registry missing it should reject.
        let mut impl_ = FilterImplementation::lowercase();
        impl_.operators.remove("regexp");
        let tree = parse("a regexp 'x'").unwrap();
        assert!(matches!(
            compile(&tree, &impl_),
            Err(CompileError::UnknownOperator(_))
        ));
    }

    #[test]
    fn compiles_and_matches_a_simple_equality() {
        let impl_ = FilterImplementation::lowercase();
        let tree = parse("something == 'Blue'").unwrap();
        let filter = compile(&tree, &impl_).unwrap();
        let obj = root(Simple("something", Value::String("Blue".into())));
        assert!(filter.matches(&obj));
    }
}
