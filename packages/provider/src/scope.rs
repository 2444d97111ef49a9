/**
 * Scope composition
 *
 * A scope is the read-through view compiled expressions resolve bare names
 * against. `ComposedScope` layers a binding context and the node being
 * bound: context metadata first, then fields of the current data. It claims
 * every name, so lookups never fall through to anything ambient.
 */
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::context::BindingContext;
use crate::node::NodeRef;
use crate::value::Value;

pub trait Scope: Send + Sync + fmt::Debug {
    /// Value for a bare name; unknown names are `undefined`
    fn lookup(&self, name: &str) -> Value;

    /// Whether the scope answers for `name`
    fn has(&self, name: &str) -> bool;
}

/// Scope over one binding context and one node
#[derive(Debug, Clone)]
pub struct ComposedScope {
    context: Arc<BindingContext>,
    element: NodeRef,
}

impl ComposedScope {
    pub fn new(context: Arc<BindingContext>, element: NodeRef) -> Self {
        ComposedScope { context, element }
    }

    pub fn context(&self) -> &Arc<BindingContext> {
        &self.context
    }

    pub fn element(&self) -> &NodeRef {
        &self.element
    }
}

impl Scope for ComposedScope {
    fn lookup(&self, name: &str) -> Value {
        if name == "$element" {
            return Value::Node(Arc::clone(&self.element));
        }
        self.context.lookup(name)
    }

    fn has(&self, _name: &str) -> bool {
        true
    }
}

/// Compose the evaluation scope for `node` under `context`
pub fn compose(context: &Arc<BindingContext>, node: &NodeRef) -> Arc<dyn Scope> {
    Arc::new(ComposedScope::new(Arc::clone(context), Arc::clone(node)))
}

/// Function parameters layered over the scope the function was created in
#[derive(Debug)]
pub struct FrameScope {
    locals: SmallVec<[(String, Value); 2]>,
    parent: Arc<dyn Scope>,
}

impl FrameScope {
    pub fn new(locals: SmallVec<[(String, Value); 2]>, parent: Arc<dyn Scope>) -> Self {
        FrameScope { locals, parent }
    }

    fn local(&self, name: &str) -> Option<&Value> {
        // Later parameters win, as with `(a, a) => a`
        self.locals
            .iter()
            .rev()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value)
    }
}

impl Scope for FrameScope {
    fn lookup(&self, name: &str) -> Value {
        match self.local(name) {
            Some(value) => value.clone(),
            None => self.parent.lookup(name),
        }
    }

    fn has(&self, name: &str) -> bool {
        self.local(name).is_some() || self.parent.has(name)
    }
}
