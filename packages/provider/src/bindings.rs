/**
 * Binding accessor mapping
 *
 * What `get_binding_accessors` hands to binding handlers: binding name to
 * either a literal value or a zero-argument accessor over the node's scope.
 */
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{BindingResolutionError, EvaluationResult};
use crate::expression_parser::ast::AST;
use crate::expression_parser::serialize;
use crate::interpreter;
use crate::node::NodeRef;
use crate::scope::Scope;
use crate::value::Value;

/// Zero-argument accessor: re-evaluates its expression on every call
#[derive(Clone)]
pub struct Accessor {
    expression: Arc<AST>,
    scope: Arc<dyn Scope>,
}

impl Accessor {
    pub fn new(expression: Arc<AST>, scope: Arc<dyn Scope>) -> Self {
        Accessor { expression, scope }
    }

    pub fn call(&self) -> EvaluationResult<Value> {
        interpreter::evaluate(&self.expression, &self.scope)
    }

    pub fn expression(&self) -> &AST {
        &self.expression
    }

    pub fn scope(&self) -> &Arc<dyn Scope> {
        &self.scope
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Accessor(() => {})", serialize(&self.expression))
    }
}

#[derive(Debug, Clone)]
pub enum BindingValue {
    Literal(Value),
    Accessor(Accessor),
}

impl BindingValue {
    /// Current value: the literal itself, or the accessor's result
    pub fn get(&self) -> EvaluationResult<Value> {
        match self {
            BindingValue::Literal(value) => Ok(value.clone()),
            BindingValue::Accessor(accessor) => accessor.call(),
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self, BindingValue::Accessor(_))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            BindingValue::Literal(value) => Some(value),
            BindingValue::Accessor(_) => None,
        }
    }
}

/// Resolved bindings of one node, in declaration order
#[derive(Debug, Clone)]
pub struct BindingAccessors {
    node: NodeRef,
    bindings_text: String,
    values: IndexMap<String, BindingValue>,
}

impl BindingAccessors {
    pub fn new(
        node: NodeRef,
        bindings_text: impl Into<String>,
        values: IndexMap<String, BindingValue>,
    ) -> Self {
        BindingAccessors {
            node,
            bindings_text: bindings_text.into(),
            values,
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn bindings_text(&self) -> &str {
        &self.bindings_text
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, BindingValue> {
        self.values.iter()
    }

    /// Current value of `name`; an undeclared name reads as `undefined`
    pub fn read(&self, name: &str) -> Result<Value, BindingResolutionError> {
        match self.values.get(name) {
            Some(value) => value.get().map_err(|source| {
                BindingResolutionError::evaluation(
                    Arc::clone(&self.node),
                    self.bindings_text.as_str(),
                    Some(name.to_string()),
                    source,
                )
            }),
            None => Ok(Value::Undefined),
        }
    }

    /// Current value of every binding
    pub fn read_all(&self) -> Result<IndexMap<String, Value>, BindingResolutionError> {
        self.values
            .keys()
            .map(|name| Ok((name.clone(), self.read(name)?)))
            .collect()
    }

    pub fn into_inner(self) -> IndexMap<String, BindingValue> {
        self.values
    }
}

impl<'a> IntoIterator for &'a BindingAccessors {
    type Item = (&'a String, &'a BindingValue);
    type IntoIter = indexmap::map::Iter<'a, String, BindingValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
