/**
 * Expression interpreter
 *
 * Walks a binding expression AST against a scope. Bare names go through
 * `Scope::lookup`; everything else follows JavaScript semantics closely
 * enough for declarative bindings.
 */
use std::cell::Cell;
use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{EvaluationError, EvaluationResult};
use crate::expression_parser::ast::*;
use crate::expression_parser::serialize;
use crate::scope::{FrameScope, Scope};
use crate::value::{Closure, Function, Value};

/// Deepest evaluation (nested expressions plus active calls) on one thread
pub const MAX_EVALUATION_DEPTH: usize = 256;

thread_local! {
    static EVALUATION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One level of evaluation on the current thread, released on drop.
///
/// Counted per thread rather than per interpreter so recursion through host
/// functions calling back into closures is bounded too.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> EvaluationResult<DepthGuard> {
        EVALUATION_DEPTH.with(|depth| {
            if depth.get() >= MAX_EVALUATION_DEPTH {
                return Err(EvaluationError::range("Maximum call stack size exceeded"));
            }
            depth.set(depth.get() + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EVALUATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Evaluate `ast` against `scope`
pub fn evaluate(ast: &AST, scope: &Arc<dyn Scope>) -> EvaluationResult<Value> {
    Interpreter::new(Arc::clone(scope)).evaluate(ast)
}

/// Call a function expression with positional arguments; missing ones are `undefined`
pub(crate) fn invoke_lambda(
    lambda: &Lambda,
    scope: &Arc<dyn Scope>,
    args: &[Value],
) -> EvaluationResult<Value> {
    let locals: SmallVec<[(String, Value); 2]> = lambda
        .params
        .iter()
        .enumerate()
        .map(|(i, param)| (param.clone(), args.get(i).cloned().unwrap_or_default()))
        .collect();
    let frame: Arc<dyn Scope> = Arc::new(FrameScope::new(locals, Arc::clone(scope)));
    let mut interpreter = Interpreter::new(frame);

    match &lambda.body {
        LambdaBody::Expression(body) => interpreter.evaluate(body),
        LambdaBody::Block(statements) => {
            for statement in statements {
                match statement {
                    FunctionStatement::Expression(expression) => {
                        interpreter.evaluate(expression)?;
                    }
                    FunctionStatement::Return(Some(expression)) => {
                        return interpreter.evaluate(expression)
                    }
                    FunctionStatement::Return(None) => return Ok(Value::Undefined),
                }
            }
            Ok(Value::Undefined)
        }
    }
}

pub struct Interpreter {
    scope: Arc<dyn Scope>,
}

impl Interpreter {
    pub fn new(scope: Arc<dyn Scope>) -> Self {
        Interpreter { scope }
    }

    pub fn evaluate(&mut self, ast: &AST) -> EvaluationResult<Value> {
        let _guard = DepthGuard::enter()?;
        ast.visit(self)
    }

    fn resolve_name(&self, name: &str) -> EvaluationResult<Value> {
        if !self.scope.has(name) {
            return Err(EvaluationError::Reference {
                name: name.to_string(),
            });
        }
        Ok(self.scope.lookup(name))
    }

    /// One link of a member/call chain. `None` means a `?.` further up the
    /// chain met `undefined`/`null` and the rest of the chain is skipped.
    fn chain(&mut self, ast: &AST) -> EvaluationResult<Option<Value>> {
        let _guard = DepthGuard::enter()?;
        match ast {
            AST::PropertyRead(read) => self.property_read(read),
            AST::SafePropertyRead(read) => self.safe_property_read(read),
            AST::KeyedRead(read) => self.keyed_read(read),
            AST::SafeKeyedRead(read) => self.safe_keyed_read(read),
            AST::Call(call) => self.call(&call.receiver, &call.args, false),
            AST::SafeCall(call) => self.call(&call.receiver, &call.args, true),
            _ => self.evaluate(ast).map(Some),
        }
    }

    fn property_read(&mut self, read: &PropertyRead) -> EvaluationResult<Option<Value>> {
        if matches!(*read.receiver, AST::ImplicitReceiver(_)) {
            return self.resolve_name(&read.name).map(Some);
        }
        let Some(receiver) = self.chain(&read.receiver)? else {
            return Ok(None);
        };
        read_member(&receiver, &read.name).map(Some)
    }

    fn safe_property_read(&mut self, read: &SafePropertyRead) -> EvaluationResult<Option<Value>> {
        let Some(receiver) = self.chain(&read.receiver)? else {
            return Ok(None);
        };
        if receiver.is_nullish() {
            return Ok(None);
        }
        Ok(Some(receiver.member(&read.name)))
    }

    fn keyed_read(&mut self, read: &KeyedRead) -> EvaluationResult<Option<Value>> {
        let Some(receiver) = self.chain(&read.receiver)? else {
            return Ok(None);
        };
        let key = self.evaluate(&read.key)?.to_js_string();
        read_member(&receiver, &key).map(Some)
    }

    fn safe_keyed_read(&mut self, read: &SafeKeyedRead) -> EvaluationResult<Option<Value>> {
        let Some(receiver) = self.chain(&read.receiver)? else {
            return Ok(None);
        };
        if receiver.is_nullish() {
            return Ok(None);
        }
        let key = self.evaluate(&read.key)?.to_js_string();
        Ok(Some(receiver.member(&key)))
    }

    fn call(
        &mut self,
        receiver: &AST,
        args: &[AST],
        is_safe: bool,
    ) -> EvaluationResult<Option<Value>> {
        let Some(callee) = self.chain(receiver)? else {
            return Ok(None);
        };
        if is_safe && callee.is_nullish() {
            return Ok(None);
        }

        let function = match callee {
            Value::Function(function) => function,
            _ => {
                return Err(EvaluationError::NotCallable {
                    callee: serialize(receiver),
                })
            }
        };
        let args = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<EvaluationResult<Vec<_>>>()?;
        function.call(&args).map(Some)
    }

    fn binary(&mut self, ast: &Binary) -> EvaluationResult<Value> {
        // Short-circuiting operators evaluate the right side lazily
        match ast.operation.as_str() {
            "&&" => {
                let left = self.evaluate(&ast.left)?;
                return if left.is_truthy() {
                    self.evaluate(&ast.right)
                } else {
                    Ok(left)
                };
            }
            "||" => {
                let left = self.evaluate(&ast.left)?;
                return if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(&ast.right)
                };
            }
            "??" => {
                let left = self.evaluate(&ast.left)?;
                return if left.is_nullish() {
                    self.evaluate(&ast.right)
                } else {
                    Ok(left)
                };
            }
            _ => {}
        }

        let left = self.evaluate(&ast.left)?;
        let right = self.evaluate(&ast.right)?;

        let result = match ast.operation.as_str() {
            "+" => add(&left, &right),
            "-" => Value::Number(left.to_number() - right.to_number()),
            "*" => Value::Number(left.to_number() * right.to_number()),
            "/" => Value::Number(left.to_number() / right.to_number()),
            "%" => Value::Number(left.to_number() % right.to_number()),
            "**" => Value::Number(left.to_number().powf(right.to_number())),
            "==" => Value::Bool(left.loose_equals(&right)),
            "!=" => Value::Bool(!left.loose_equals(&right)),
            "===" => Value::Bool(left.strict_equals(&right)),
            "!==" => Value::Bool(!left.strict_equals(&right)),
            "<" => Value::Bool(matches!(compare(&left, &right), Some(Ordering::Less))),
            ">" => Value::Bool(matches!(compare(&left, &right), Some(Ordering::Greater))),
            "<=" => Value::Bool(matches!(
                compare(&left, &right),
                Some(Ordering::Less | Ordering::Equal)
            )),
            ">=" => Value::Bool(matches!(
                compare(&left, &right),
                Some(Ordering::Greater | Ordering::Equal)
            )),
            "in" => {
                let key = left.to_js_string();
                match right {
                    Value::Object(_) | Value::Array(_) | Value::Context(_) | Value::Node(_) => {
                        Value::Bool(right.has_member(&key))
                    }
                    _ => {
                        return Err(EvaluationError::type_error(format!(
                            "Cannot use 'in' operator to search for '{}' in {}",
                            key,
                            right.to_js_string()
                        )))
                    }
                }
            }
            operation => {
                return Err(EvaluationError::type_error(format!(
                    "Unsupported operator '{}'",
                    operation
                )))
            }
        };
        Ok(result)
    }
}

fn read_member(receiver: &Value, name: &str) -> EvaluationResult<Value> {
    if receiver.is_nullish() {
        return Err(EvaluationError::type_error(format!(
            "Cannot read properties of {} (reading '{}')",
            receiver.to_js_string(),
            name
        )));
    }
    Ok(receiver.member(name))
}

fn add(left: &Value, right: &Value) -> Value {
    let left = left.to_primitive();
    let right = right.to_primitive();
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        Value::from(left.to_js_string() + &right.to_js_string())
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let left = left.to_primitive();
    let right = right.to_primitive();
    if let (Value::String(a), Value::String(b)) = (&left, &right) {
        return Some(a.cmp(b));
    }
    left.to_number().partial_cmp(&right.to_number())
}

impl AstVisitor for Interpreter {
    type Result = EvaluationResult<Value>;

    fn visit_empty(&mut self, _ast: &EmptyExpr) -> Self::Result {
        Ok(Value::Undefined)
    }

    fn visit_implicit_receiver(&mut self, _ast: &ImplicitReceiver) -> Self::Result {
        Ok(Value::Undefined)
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> Self::Result {
        if self.evaluate(&ast.condition)?.is_truthy() {
            self.evaluate(&ast.true_exp)
        } else {
            self.evaluate(&ast.false_exp)
        }
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> Self::Result {
        Ok(self.property_read(ast)?.unwrap_or_default())
    }

    fn visit_safe_property_read(&mut self, ast: &SafePropertyRead) -> Self::Result {
        Ok(self.safe_property_read(ast)?.unwrap_or_default())
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> Self::Result {
        Ok(self.keyed_read(ast)?.unwrap_or_default())
    }

    fn visit_safe_keyed_read(&mut self, ast: &SafeKeyedRead) -> Self::Result {
        Ok(self.safe_keyed_read(ast)?.unwrap_or_default())
    }

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> Self::Result {
        Ok(match ast {
            LiteralPrimitive::String { value, .. } => Value::from(value.as_str()),
            LiteralPrimitive::Number { value, .. } => Value::Number(*value),
            LiteralPrimitive::Boolean { value, .. } => Value::Bool(*value),
            LiteralPrimitive::Null { .. } => Value::Null,
            LiteralPrimitive::Undefined { .. } => Value::Undefined,
        })
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> Self::Result {
        let items = ast
            .expressions
            .iter()
            .map(|e| self.evaluate(e))
            .collect::<EvaluationResult<Vec<_>>>()?;
        Ok(Value::array(items))
    }

    fn visit_literal_map(&mut self, ast: &LiteralMap) -> Self::Result {
        let mut entries = IndexMap::with_capacity(ast.keys.len());
        for (key, value) in ast.keys.iter().zip(ast.values.iter()) {
            let value = self.evaluate(value)?;
            entries.insert(key.key.clone(), value);
        }
        Ok(Value::object(entries))
    }

    fn visit_binary(&mut self, ast: &Binary) -> Self::Result {
        self.binary(ast)
    }

    fn visit_prefix_not(&mut self, ast: &PrefixNot) -> Self::Result {
        Ok(Value::Bool(!self.evaluate(&ast.expression)?.is_truthy()))
    }

    fn visit_unary(&mut self, ast: &Unary) -> Self::Result {
        let number = self.evaluate(&ast.expr)?.to_number();
        match ast.operator.as_str() {
            "-" => Ok(Value::Number(-number)),
            "+" => Ok(Value::Number(number)),
            operator => Err(EvaluationError::type_error(format!(
                "Unsupported unary operator '{}'",
                operator
            ))),
        }
    }

    fn visit_typeof(&mut self, ast: &TypeofExpression) -> Self::Result {
        let value = self.evaluate(&ast.expression)?;
        Ok(Value::from(value.type_of()))
    }

    fn visit_void(&mut self, ast: &VoidExpression) -> Self::Result {
        self.evaluate(&ast.expression)?;
        Ok(Value::Undefined)
    }

    fn visit_call(&mut self, ast: &Call) -> Self::Result {
        Ok(self.call(&ast.receiver, &ast.args, false)?.unwrap_or_default())
    }

    fn visit_safe_call(&mut self, ast: &SafeCall) -> Self::Result {
        Ok(self.call(&ast.receiver, &ast.args, true)?.unwrap_or_default())
    }

    fn visit_template_literal(&mut self, ast: &TemplateLiteral) -> Self::Result {
        let mut result = String::new();
        for (idx, elem) in ast.elements.iter().enumerate() {
            result.push_str(&elem.text);
            if let Some(expression) = ast.expressions.get(idx) {
                result.push_str(&self.evaluate(expression)?.to_js_string());
            }
        }
        Ok(Value::from(result))
    }

    fn visit_parenthesized(&mut self, ast: &ParenthesizedExpression) -> Self::Result {
        self.evaluate(&ast.expression)
    }

    fn visit_lambda(&mut self, ast: &Lambda) -> Self::Result {
        Ok(Value::Function(Function::Lambda(Arc::new(Closure {
            lambda: ast.clone(),
            scope: Arc::clone(&self.scope),
        }))))
    }
}
