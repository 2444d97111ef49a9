/**
 * Expression Compiler
 *
 * Turns raw annotation text into a reusable `Evaluator`. Compilation is
 * deterministic, so evaluators are memoized in the injected cache by exact
 * text; failed compilations are never cached.
 */
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bindings::{Accessor, BindingValue};
use crate::cache::EvaluatorCache;
use crate::error::{CompilationError, ResolutionCause};
use crate::expression_parser::ast::*;
use crate::expression_parser::{serialize_bindings, Parser};
use crate::interpreter;
use crate::scope::Scope;

/// How a binding's value reaches the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingForm {
    /// Reads nothing from the scope: evaluated once, when accessors are resolved
    Literal,
    /// Depends on the scope: handed out as a zero-argument accessor
    Accessor,
}

#[derive(Debug, Clone)]
pub struct CompiledBinding {
    pub name: String,
    pub form: BindingForm,
    pub expression: Arc<AST>,
}

/// Compiled form of one annotation text
#[derive(Debug)]
pub struct Evaluator {
    source: String,
    bindings: Vec<CompiledBinding>,
}

impl Evaluator {
    fn from_declarations(source: &str, declarations: Vec<BindingDeclaration>) -> Self {
        // Object-literal semantics: a repeated key keeps its first position, last value
        let mut by_name: IndexMap<String, CompiledBinding> = IndexMap::new();
        for declaration in declarations {
            let expression = declaration.value_or_undefined();
            let form = if reads_scope(&expression) {
                BindingForm::Accessor
            } else {
                BindingForm::Literal
            };
            let name = declaration.name().to_string();
            by_name.insert(
                name.clone(),
                CompiledBinding {
                    name,
                    form,
                    expression: Arc::new(expression),
                },
            );
        }

        Evaluator {
            source: source.to_string(),
            bindings: by_name.into_values().collect(),
        }
    }

    /// The raw annotation text this evaluator was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn bindings(&self) -> &[CompiledBinding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Canonical object-literal rendering, e.g. `{'text': name}`
    pub fn canonical_source(&self) -> String {
        let declarations: Vec<BindingDeclaration> = self
            .bindings
            .iter()
            .map(|binding| BindingDeclaration {
                key: LiteralMapKey {
                    key: binding.name.clone(),
                    quoted: true,
                },
                key_span: ParseSpan::default(),
                value: Some((*binding.expression).clone()),
            })
            .collect();
        serialize_bindings(&declarations)
    }

    /// Map every binding name to its value or accessor over `scope`.
    ///
    /// Literal-form bindings are evaluated here, so their runtime failures
    /// surface immediately.
    pub fn evaluate(
        &self,
        scope: &Arc<dyn Scope>,
    ) -> Result<IndexMap<String, BindingValue>, ResolutionCause> {
        let mut values = IndexMap::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let value = match binding.form {
                BindingForm::Literal => interpreter::evaluate(&binding.expression, scope)
                    .map(BindingValue::Literal)
                    .map_err(|source| ResolutionCause::Evaluation {
                        binding: Some(binding.name.clone()),
                        source,
                    })?,
                BindingForm::Accessor => BindingValue::Accessor(Accessor::new(
                    Arc::clone(&binding.expression),
                    Arc::clone(scope),
                )),
            };
            values.insert(binding.name.clone(), value);
        }
        Ok(values)
    }
}

/// Compiles annotation text through the shared evaluator cache
#[derive(Debug, Clone)]
pub struct ExpressionCompiler {
    parser: Parser,
    cache: Arc<EvaluatorCache>,
}

impl Default for ExpressionCompiler {
    fn default() -> Self {
        Self::new(Arc::new(EvaluatorCache::new()))
    }
}

impl ExpressionCompiler {
    pub fn new(cache: Arc<EvaluatorCache>) -> Self {
        ExpressionCompiler {
            parser: Parser::new(),
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<EvaluatorCache> {
        &self.cache
    }

    pub fn compile(&self, text: &str) -> Result<Arc<Evaluator>, CompilationError> {
        if let Some(evaluator) = self.cache.get(text) {
            trace!("evaluator cache hit for [{}]", text);
            return Ok(evaluator);
        }

        debug!("compiling bindings [{}]", text);
        let declarations = self.parser.parse_bindings(text).map_err(|source| {
            debug!("failed to compile bindings [{}]: {}", text, source);
            CompilationError {
                bindings_text: text.to_string(),
                source,
            }
        })?;

        let evaluator = Arc::new(Evaluator::from_declarations(text, declarations));
        Ok(self.cache.insert_if_absent(text, evaluator))
    }
}

/// Whether evaluating `ast` reads a scope name or calls a function.
/// Function bodies are not entered: creating a closure reads nothing.
pub fn reads_scope(ast: &AST) -> bool {
    ast.visit(&mut ScopeAccessFinder)
}

struct ScopeAccessFinder;

impl ScopeAccessFinder {
    fn any(&mut self, expressions: &[AST]) -> bool {
        expressions.iter().any(|e| e.visit(self))
    }
}

impl AstVisitor for ScopeAccessFinder {
    type Result = bool;

    fn visit_empty(&mut self, _ast: &EmptyExpr) -> bool {
        false
    }

    fn visit_implicit_receiver(&mut self, _ast: &ImplicitReceiver) -> bool {
        true
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> bool {
        ast.condition.visit(self) || ast.true_exp.visit(self) || ast.false_exp.visit(self)
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> bool {
        ast.receiver.visit(self)
    }

    fn visit_safe_property_read(&mut self, ast: &SafePropertyRead) -> bool {
        ast.receiver.visit(self)
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> bool {
        ast.receiver.visit(self) || ast.key.visit(self)
    }

    fn visit_safe_keyed_read(&mut self, ast: &SafeKeyedRead) -> bool {
        ast.receiver.visit(self) || ast.key.visit(self)
    }

    fn visit_literal_primitive(&mut self, _ast: &LiteralPrimitive) -> bool {
        false
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> bool {
        self.any(&ast.expressions)
    }

    fn visit_literal_map(&mut self, ast: &LiteralMap) -> bool {
        self.any(&ast.values)
    }

    fn visit_binary(&mut self, ast: &Binary) -> bool {
        ast.left.visit(self) || ast.right.visit(self)
    }

    fn visit_prefix_not(&mut self, ast: &PrefixNot) -> bool {
        ast.expression.visit(self)
    }

    fn visit_unary(&mut self, ast: &Unary) -> bool {
        ast.expr.visit(self)
    }

    fn visit_typeof(&mut self, ast: &TypeofExpression) -> bool {
        ast.expression.visit(self)
    }

    fn visit_void(&mut self, ast: &VoidExpression) -> bool {
        ast.expression.visit(self)
    }

    fn visit_call(&mut self, _ast: &Call) -> bool {
        true
    }

    fn visit_safe_call(&mut self, _ast: &SafeCall) -> bool {
        true
    }

    fn visit_template_literal(&mut self, ast: &TemplateLiteral) -> bool {
        self.any(&ast.expressions)
    }

    fn visit_parenthesized(&mut self, ast: &ParenthesizedExpression) -> bool {
        ast.expression.visit(self)
    }

    fn visit_lambda(&mut self, _ast: &Lambda) -> bool {
        false
    }
}
