/**
 * Runtime values
 *
 * Binding expressions evaluate to `Value`, a JavaScript-like dynamic value.
 * Arrays and objects are immutable and shared, so `===` on them compares
 * identity while `PartialEq` compares structure.
 */
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::context::BindingContext;
use crate::error::EvaluationResult;
use crate::expression_parser::ast::{Lambda, AST};
use crate::expression_parser::serialize;
use crate::interpreter;
use crate::node::{same_node, NodeRef};
use crate::scope::Scope;

/// Host-supplied function body
pub type NativeFn = dyn Fn(&[Value]) -> EvaluationResult<Value> + Send + Sync;

/// Function expression together with the scope it was created in
#[derive(Debug)]
pub struct Closure {
    pub lambda: Lambda,
    pub scope: Arc<dyn Scope>,
}

#[derive(Clone)]
pub enum Function {
    Native { name: Arc<str>, body: Arc<NativeFn> },
    Lambda(Arc<Closure>),
}

impl Function {
    pub fn native<F>(name: &str, body: F) -> Self
    where
        F: Fn(&[Value]) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        Function::Native {
            name: Arc::from(name),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Function::Native { name, .. } => name,
            Function::Lambda(_) => "anonymous",
        }
    }

    pub fn call(&self, args: &[Value]) -> EvaluationResult<Value> {
        match self {
            Function::Native { body, .. } => body(args),
            Function::Lambda(closure) => {
                interpreter::invoke_lambda(&closure.lambda, &closure.scope, args)
            }
        }
    }

    fn ptr_eq(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::Native { body: a, .. }, Function::Native { body: b, .. }) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Function::Lambda(a), Function::Lambda(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native { name, .. } => write!(f, "Function::Native({})", name),
            Function::Lambda(closure) => write!(
                f,
                "Function::Lambda({})",
                serialize(&AST::Lambda(closure.lambda.clone()))
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<IndexMap<String, Value>>),
    Function(Function),
    /// The node being bound (`$element`)
    Node(NodeRef),
    /// A binding context (`$context`, `$parentContext`)
    Context(Arc<BindingContext>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Arc::new(items))
    }

    pub fn object(entries: IndexMap<String, Value>) -> Value {
        Value::Object(Arc::new(entries))
    }

    /// Wrap a host closure as a callable value
    pub fn function<F>(name: &str, body: F) -> Value
    where
        F: Fn(&[Value]) -> EvaluationResult<Value> + Send + Sync + 'static,
    {
        Value::Function(Function::native(name, body))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `undefined` or `null`
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::Node(_)
            | Value::Context(_) => "object",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric conversion (`+value`)
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_js_string()),
            _ => f64::NAN,
        }
    }

    /// String conversion (`String(value)`)
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) | Value::Context(_) => "[object Object]".to_string(),
            Value::Function(Function::Native { name, .. }) => {
                format!("function {}() {{ [native code] }}", name)
            }
            Value::Function(Function::Lambda(closure)) => {
                serialize(&AST::Lambda(closure.lambda.clone()))
            }
            Value::Node(node) => node.describe(),
        }
    }

    /// Primitive form used by `+`, `==` and the relational operators
    pub fn to_primitive(&self) -> Value {
        if self.is_primitive() {
            self.clone()
        } else {
            Value::from(self.to_js_string())
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::String(b)) => *a == string_to_number(b),
            (Value::String(a), Value::Number(b)) => string_to_number(a) == *b,
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Bool(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (a, b) if a.is_primitive() && !b.is_primitive() => a.loose_equals(&b.to_primitive()),
            (a, b) if !a.is_primitive() && b.is_primitive() => a.to_primitive().loose_equals(b),
            _ => self.strict_equals(other),
        }
    }

    /// `===`: value equality for primitives, identity for everything else
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Node(a), Value::Node(b)) => same_node(a, b),
            (Value::Context(a), Value::Context(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Member read on a non-nullish value; missing members are `undefined`
    pub fn member(&self, key: &str) -> Value {
        match self {
            Value::Object(entries) => entries.get(key).cloned().unwrap_or_default(),
            Value::Array(items) => {
                if key == "length" {
                    return Value::from(items.len());
                }
                array_index(key)
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or_default()
            }
            Value::String(s) => {
                if key == "length" {
                    return Value::from(s.encode_utf16().count());
                }
                array_index(key)
                    .and_then(|index| s.encode_utf16().nth(index))
                    .map(|unit| Value::from(String::from_utf16_lossy(&[unit])))
                    .unwrap_or_default()
            }
            Value::Node(node) => match key {
                "nodeType" => Value::from(node.node_kind() as u8 as u32),
                _ => node.attribute(key).map(Value::from).unwrap_or_default(),
            },
            Value::Context(context) => context.lookup(key),
            Value::Function(function) if key == "name" => Value::from(function.name()),
            _ => Value::Undefined,
        }
    }

    /// The `in` operator's membership test
    pub fn has_member(&self, key: &str) -> bool {
        match self {
            Value::Object(entries) => entries.contains_key(key),
            Value::Array(items) => {
                key == "length" || array_index(key).map_or(false, |index| index < items.len())
            }
            Value::Context(context) => context.has(key),
            Value::Node(node) => key == "nodeType" || node.attribute(key).is_some(),
            _ => false,
        }
    }

    /// JSON rendering; `undefined` object members are omitted
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null | Value::Function(_) | Value::Context(_) => {
                serde_json::Value::Null
            }
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serde_json::Value::from(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .filter(|(_, value)| !value.is_undefined())
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Node(node) => serde_json::Value::String(node.describe()),
        }
    }
}

fn array_index(key: &str) -> Option<usize> {
    let index = key.parse::<usize>().ok()?;
    // "01" and "+1" are property names, not indices
    if index.to_string() == key {
        Some(index)
    } else {
        None
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return i64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    let numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if numeric {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // Covers -0
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => self.strict_equals(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_js_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::object(entries)
    }
}

impl From<NodeRef> for Value {
    fn from(node: NodeRef) -> Self {
        Value::Node(node)
    }
}

impl From<Arc<BindingContext>> for Value {
    fn from(context: Arc<BindingContext>) -> Self {
        Value::Context(context)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
