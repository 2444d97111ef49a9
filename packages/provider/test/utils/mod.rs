#![allow(dead_code)]

/**
 * Test Utilities
 *
 * Node, context and provider builders shared by the integration tests
 */
use std::sync::Arc;

use binding_provider::{
    BindingAccessors, BindingContext, BindingProvider, CommentNode, ElementNode, NodeRef, Value,
};

/// `<div data-bind="...">`
pub fn element(bindings: &str) -> NodeRef {
    ElementNode::new("div")
        .with_attribute("data-bind", bindings)
        .into_ref()
}

/// `<!--...-->`
pub fn comment(text: &str) -> NodeRef {
    CommentNode::new(text).into_ref()
}

pub fn value(json: serde_json::Value) -> Value {
    Value::from(json)
}

pub fn root_context(json: serde_json::Value) -> Arc<BindingContext> {
    BindingContext::root(Value::from(json))
}

/// Resolve `bindings` on a fresh element against `data` and read every binding
pub fn resolve_values(
    provider: &BindingProvider,
    bindings: &str,
    data: serde_json::Value,
) -> serde_json::Value {
    let accessors = provider
        .get_binding_accessors(&element(bindings), &root_context(data))
        .expect("bindings should resolve")
        .expect("node should have bindings");
    read_json(&accessors)
}

pub fn read_json(accessors: &BindingAccessors) -> serde_json::Value {
    let values = accessors.read_all().expect("bindings should evaluate");
    serde_json::to_value(&values).expect("values should serialize")
}
