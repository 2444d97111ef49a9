/**
 * Binding Context
 *
 * Hierarchical data-visibility structure threaded through a UI tree. Each
 * context is immutable; children and extensions are new contexts sharing
 * their ancestors through `Arc`.
 */
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::Value;

/// Names a binding context reserves; they shadow same-named data fields
pub const RESERVED_NAMES: &[&str] = &[
    "$context",
    "$data",
    "$root",
    "$parent",
    "$parents",
    "$parentContext",
    "$element",
];

#[derive(Debug)]
pub struct BindingContext {
    data: Value,
    root: Value,
    parent_context: Option<Arc<BindingContext>>,
    /// Ancestor data, nearest first
    parents: Vec<Value>,
    /// Extension properties and aliases, inherited by children
    properties: IndexMap<String, Value>,
}

impl BindingContext {
    /// Context for the top of a tree: `$data` and `$root` are both `data`
    pub fn root(data: impl Into<Value>) -> Arc<Self> {
        let data = data.into();
        Arc::new(BindingContext {
            root: data.clone(),
            data,
            parent_context: None,
            parents: Vec::new(),
            properties: IndexMap::new(),
        })
    }

    /// Context for descendants bound to `data`, optionally also exposed as `alias`
    pub fn create_child_context(
        self: &Arc<Self>,
        data: impl Into<Value>,
        alias: Option<&str>,
    ) -> Arc<Self> {
        let data = data.into();

        let mut parents = Vec::with_capacity(self.parents.len() + 1);
        parents.push(self.data.clone());
        parents.extend(self.parents.iter().cloned());

        let mut properties = self.properties.clone();
        if let Some(alias) = alias {
            properties.insert(alias.to_string(), data.clone());
        }

        Arc::new(BindingContext {
            data,
            root: self.root.clone(),
            parent_context: Some(Arc::clone(self)),
            parents,
            properties,
        })
    }

    /// Same context with extra named properties such as `$index`
    pub fn extend(self: &Arc<Self>, properties: IndexMap<String, Value>) -> Arc<Self> {
        let mut merged = self.properties.clone();
        merged.extend(properties);

        Arc::new(BindingContext {
            data: self.data.clone(),
            root: self.root.clone(),
            parent_context: self.parent_context.clone(),
            parents: self.parents.clone(),
            properties: merged,
        })
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn root_data(&self) -> &Value {
        &self.root
    }

    pub fn parent_data(&self) -> Option<&Value> {
        self.parents.first()
    }

    pub fn parent_context(&self) -> Option<&Arc<BindingContext>> {
        self.parent_context.as_ref()
    }

    pub fn parents(&self) -> &[Value] {
        &self.parents
    }

    pub fn properties(&self) -> &IndexMap<String, Value> {
        &self.properties
    }

    pub fn is_root(&self) -> bool {
        self.parent_context.is_none()
    }

    /// Whether `name` resolves to context metadata rather than a data field
    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name) || self.properties.contains_key(name)
    }

    /// Metadata value for a reserved name, `None` for anything else
    pub fn metadata(self: &Arc<Self>, name: &str) -> Option<Value> {
        let value = match name {
            "$context" => Value::Context(Arc::clone(self)),
            "$data" => self.data.clone(),
            "$root" => self.root.clone(),
            "$parent" => self.parents.first().cloned().unwrap_or_default(),
            "$parents" => Value::array(self.parents.clone()),
            "$parentContext" => self
                .parent_context
                .as_ref()
                .map(|parent| Value::Context(Arc::clone(parent)))
                .unwrap_or_default(),
            // Only a composed scope knows which node is being bound
            "$element" => Value::Undefined,
            _ => return self.properties.get(name).cloned(),
        };
        Some(value)
    }

    /// Metadata first, then a field of the current data
    pub fn lookup(self: &Arc<Self>, name: &str) -> Value {
        if let Some(value) = self.metadata(name) {
            return value;
        }
        if self.data.is_nullish() {
            return Value::Undefined;
        }
        self.data.member(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.is_reserved(name) || self.data.has_member(name)
    }
}
