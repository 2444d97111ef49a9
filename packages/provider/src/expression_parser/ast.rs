/**
 * Binding Expression AST
 *
 * Node types for the JavaScript-like expressions found on the right-hand
 * side of each `name: expression` pair, plus the binding list itself.
 */
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Byte span inside the annotation text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    /// Slice of `input` covered by this span, if it is in bounds
    pub fn slice<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.start..self.end)
    }
}

/// Visitor pattern for AST traversal
pub trait AstVisitor {
    type Result;

    fn visit_empty(&mut self, ast: &EmptyExpr) -> Self::Result;
    fn visit_implicit_receiver(&mut self, ast: &ImplicitReceiver) -> Self::Result;
    fn visit_conditional(&mut self, ast: &Conditional) -> Self::Result;
    fn visit_property_read(&mut self, ast: &PropertyRead) -> Self::Result;
    fn visit_safe_property_read(&mut self, ast: &SafePropertyRead) -> Self::Result;
    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> Self::Result;
    fn visit_safe_keyed_read(&mut self, ast: &SafeKeyedRead) -> Self::Result;
    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> Self::Result;
    fn visit_literal_array(&mut self, ast: &LiteralArray) -> Self::Result;
    fn visit_literal_map(&mut self, ast: &LiteralMap) -> Self::Result;
    fn visit_binary(&mut self, ast: &Binary) -> Self::Result;
    fn visit_prefix_not(&mut self, ast: &PrefixNot) -> Self::Result;
    fn visit_unary(&mut self, ast: &Unary) -> Self::Result;
    fn visit_typeof(&mut self, ast: &TypeofExpression) -> Self::Result;
    fn visit_void(&mut self, ast: &VoidExpression) -> Self::Result;
    fn visit_call(&mut self, ast: &Call) -> Self::Result;
    fn visit_safe_call(&mut self, ast: &SafeCall) -> Self::Result;
    fn visit_template_literal(&mut self, ast: &TemplateLiteral) -> Self::Result;
    fn visit_parenthesized(&mut self, ast: &ParenthesizedExpression) -> Self::Result;
    fn visit_lambda(&mut self, ast: &Lambda) -> Self::Result;
}

/// Main AST enum containing all node types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AST {
    EmptyExpr(EmptyExpr),
    ImplicitReceiver(ImplicitReceiver),
    Conditional(Conditional),
    PropertyRead(PropertyRead),
    SafePropertyRead(SafePropertyRead),
    KeyedRead(KeyedRead),
    SafeKeyedRead(SafeKeyedRead),
    LiteralPrimitive(LiteralPrimitive),
    LiteralArray(LiteralArray),
    LiteralMap(LiteralMap),
    Binary(Binary),
    PrefixNot(PrefixNot),
    Unary(Unary),
    TypeofExpression(TypeofExpression),
    VoidExpression(VoidExpression),
    Call(Call),
    SafeCall(SafeCall),
    TemplateLiteral(TemplateLiteral),
    ParenthesizedExpression(ParenthesizedExpression),
    Lambda(Lambda),
}

impl AST {
    pub fn visit<V: AstVisitor>(&self, visitor: &mut V) -> V::Result {
        match self {
            AST::EmptyExpr(e) => visitor.visit_empty(e),
            AST::ImplicitReceiver(e) => visitor.visit_implicit_receiver(e),
            AST::Conditional(e) => visitor.visit_conditional(e),
            AST::PropertyRead(e) => visitor.visit_property_read(e),
            AST::SafePropertyRead(e) => visitor.visit_safe_property_read(e),
            AST::KeyedRead(e) => visitor.visit_keyed_read(e),
            AST::SafeKeyedRead(e) => visitor.visit_safe_keyed_read(e),
            AST::LiteralPrimitive(e) => visitor.visit_literal_primitive(e),
            AST::LiteralArray(e) => visitor.visit_literal_array(e),
            AST::LiteralMap(e) => visitor.visit_literal_map(e),
            AST::Binary(e) => visitor.visit_binary(e),
            AST::PrefixNot(e) => visitor.visit_prefix_not(e),
            AST::Unary(e) => visitor.visit_unary(e),
            AST::TypeofExpression(e) => visitor.visit_typeof(e),
            AST::VoidExpression(e) => visitor.visit_void(e),
            AST::Call(e) => visitor.visit_call(e),
            AST::SafeCall(e) => visitor.visit_safe_call(e),
            AST::TemplateLiteral(e) => visitor.visit_template_literal(e),
            AST::ParenthesizedExpression(e) => visitor.visit_parenthesized(e),
            AST::Lambda(e) => visitor.visit_lambda(e),
        }
    }

    /// Length of the longest path from this node down to a leaf
    pub fn depth(&self) -> usize {
        self.visit(&mut DepthMeter)
    }

    pub fn span(&self) -> ParseSpan {
        match self {
            AST::EmptyExpr(e) => e.span,
            AST::ImplicitReceiver(e) => e.span,
            AST::Conditional(e) => e.span,
            AST::PropertyRead(e) => e.span,
            AST::SafePropertyRead(e) => e.span,
            AST::KeyedRead(e) => e.span,
            AST::SafeKeyedRead(e) => e.span,
            AST::LiteralPrimitive(e) => e.span(),
            AST::LiteralArray(e) => e.span,
            AST::LiteralMap(e) => e.span,
            AST::Binary(e) => e.span,
            AST::PrefixNot(e) => e.span,
            AST::Unary(e) => e.span,
            AST::TypeofExpression(e) => e.span,
            AST::VoidExpression(e) => e.span,
            AST::Call(e) => e.span,
            AST::SafeCall(e) => e.span,
            AST::TemplateLiteral(e) => e.span,
            AST::ParenthesizedExpression(e) => e.span,
            AST::Lambda(e) => e.span,
        }
    }

    /// Whether this is a bare name resolved against the scope (`name`, not `a.name`)
    pub fn as_scope_name(&self) -> Option<&str> {
        match self {
            AST::PropertyRead(read) if matches!(*read.receiver, AST::ImplicitReceiver(_)) => {
                Some(&read.name)
            }
            _ => None,
        }
    }
}

/// Empty expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyExpr {
    pub span: ParseSpan,
}

/// Implicit receiver: the composed scope a bare identifier is looked up in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplicitReceiver {
    pub span: ParseSpan,
}

/// Ternary conditional (e.g., `condition ? true : false`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conditional {
    pub span: ParseSpan,
    pub condition: Box<AST>,
    pub true_exp: Box<AST>,
    pub false_exp: Box<AST>,
}

/// Property read (e.g., `obj.property`, or `name` on the implicit receiver)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRead {
    pub span: ParseSpan,
    pub name_span: ParseSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

/// Safe property read (e.g., `obj?.property`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafePropertyRead {
    pub span: ParseSpan,
    pub name_span: ParseSpan,
    pub receiver: Box<AST>,
    pub name: String,
}

/// Keyed read (e.g., `obj[key]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyedRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// Safe keyed read (e.g., `obj?.[key]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeKeyedRead {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub key: Box<AST>,
}

/// Literal primitive (string, number, boolean, null, undefined)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "literalType")]
pub enum LiteralPrimitive {
    String { span: ParseSpan, value: String },
    Number { span: ParseSpan, value: f64 },
    Boolean { span: ParseSpan, value: bool },
    Null { span: ParseSpan },
    Undefined { span: ParseSpan },
}

impl LiteralPrimitive {
    pub fn string(span: ParseSpan, value: String) -> Self {
        LiteralPrimitive::String { span, value }
    }

    pub fn number(span: ParseSpan, value: f64) -> Self {
        LiteralPrimitive::Number { span, value }
    }

    pub fn boolean(span: ParseSpan, value: bool) -> Self {
        LiteralPrimitive::Boolean { span, value }
    }

    pub fn null(span: ParseSpan) -> Self {
        LiteralPrimitive::Null { span }
    }

    pub fn undefined(span: ParseSpan) -> Self {
        LiteralPrimitive::Undefined { span }
    }

    pub fn span(&self) -> ParseSpan {
        match self {
            LiteralPrimitive::String { span, .. }
            | LiteralPrimitive::Number { span, .. }
            | LiteralPrimitive::Boolean { span, .. }
            | LiteralPrimitive::Null { span }
            | LiteralPrimitive::Undefined { span } => *span,
        }
    }
}

/// Array literal (e.g., `[1, 2, 3]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralArray {
    pub span: ParseSpan,
    pub expressions: Vec<AST>,
}

/// Map literal key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

/// Object literal (e.g., `{a: 1, b: 2}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteralMap {
    pub span: ParseSpan,
    pub keys: Vec<LiteralMapKey>,
    pub values: Vec<AST>,
}

/// Binary operator, including the short-circuiting `&&`, `||` and `??`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binary {
    pub span: ParseSpan,
    pub operation: String,
    pub left: Box<AST>,
    pub right: Box<AST>,
}

/// Prefix not operator (e.g., `!expr`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixNot {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

/// Unary operator (e.g., `+expr`, `-expr`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unary {
    pub span: ParseSpan,
    pub operator: String,
    pub expr: Box<AST>,
}

/// `typeof expr`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeofExpression {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

/// `void expr`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidExpression {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

/// Function call (e.g., `fn(a, b)`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Call {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    pub has_trailing_comma: bool,
}

/// Safe function call (e.g., `fn?.(a, b)`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeCall {
    pub span: ParseSpan,
    pub receiver: Box<AST>,
    pub args: Vec<AST>,
    pub has_trailing_comma: bool,
}

/// Template literal (e.g., `` `Hello ${name}` ``)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLiteral {
    pub span: ParseSpan,
    pub elements: Vec<TemplateLiteralElement>,
    pub expressions: Vec<AST>,
}

/// Template literal element (string part)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLiteralElement {
    pub span: ParseSpan,
    pub text: String,
}

/// Parenthesized expression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub span: ParseSpan,
    pub expression: Box<AST>,
}

/// Function expression: `x => e`, `(a, b) => e` or `function (a) { return e; }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lambda {
    pub span: ParseSpan,
    pub params: SmallVec<[String; 2]>,
    pub body: LambdaBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LambdaBody {
    /// Arrow function with an expression body
    Expression(Box<AST>),
    /// `function` body: statements separated by `;`
    Block(Vec<FunctionStatement>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FunctionStatement {
    Expression(AST),
    Return(Option<AST>),
}

/// One `name: expression` entry of an annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingDeclaration {
    pub key: LiteralMapKey,
    pub key_span: ParseSpan,
    /// `None` when the key is written without a value (`name` alone)
    pub value: Option<AST>,
}

impl BindingDeclaration {
    pub fn name(&self) -> &str {
        &self.key.key
    }

    /// The value expression, `undefined` for a key written on its own
    pub fn value_or_undefined(&self) -> AST {
        match &self.value {
            Some(value) => value.clone(),
            None => AST::LiteralPrimitive(LiteralPrimitive::undefined(self.key_span)),
        }
    }
}

struct DepthMeter;

impl DepthMeter {
    fn deepest<'a>(&mut self, children: impl IntoIterator<Item = &'a AST>) -> usize {
        1 + children.into_iter().map(|child| child.visit(self)).max().unwrap_or(0)
    }
}

impl AstVisitor for DepthMeter {
    type Result = usize;

    fn visit_empty(&mut self, _ast: &EmptyExpr) -> usize {
        1
    }

    fn visit_implicit_receiver(&mut self, _ast: &ImplicitReceiver) -> usize {
        1
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> usize {
        self.deepest([&*ast.condition, &*ast.true_exp, &*ast.false_exp])
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> usize {
        self.deepest([&*ast.receiver])
    }

    fn visit_safe_property_read(&mut self, ast: &SafePropertyRead) -> usize {
        self.deepest([&*ast.receiver])
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> usize {
        self.deepest([&*ast.receiver, &*ast.key])
    }

    fn visit_safe_keyed_read(&mut self, ast: &SafeKeyedRead) -> usize {
        self.deepest([&*ast.receiver, &*ast.key])
    }

    fn visit_literal_primitive(&mut self, _ast: &LiteralPrimitive) -> usize {
        1
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> usize {
        self.deepest(&ast.expressions)
    }

    fn visit_literal_map(&mut self, ast: &LiteralMap) -> usize {
        self.deepest(&ast.values)
    }

    fn visit_binary(&mut self, ast: &Binary) -> usize {
        self.deepest([&*ast.left, &*ast.right])
    }

    fn visit_prefix_not(&mut self, ast: &PrefixNot) -> usize {
        self.deepest([&*ast.expression])
    }

    fn visit_unary(&mut self, ast: &Unary) -> usize {
        self.deepest([&*ast.expr])
    }

    fn visit_typeof(&mut self, ast: &TypeofExpression) -> usize {
        self.deepest([&*ast.expression])
    }

    fn visit_void(&mut self, ast: &VoidExpression) -> usize {
        self.deepest([&*ast.expression])
    }

    fn visit_call(&mut self, ast: &Call) -> usize {
        self.deepest(std::iter::once(&*ast.receiver).chain(&ast.args))
    }

    fn visit_safe_call(&mut self, ast: &SafeCall) -> usize {
        self.deepest(std::iter::once(&*ast.receiver).chain(&ast.args))
    }

    fn visit_template_literal(&mut self, ast: &TemplateLiteral) -> usize {
        self.deepest(&ast.expressions)
    }

    fn visit_parenthesized(&mut self, ast: &ParenthesizedExpression) -> usize {
        self.deepest([&*ast.expression])
    }

    fn visit_lambda(&mut self, ast: &Lambda) -> usize {
        match &ast.body {
            LambdaBody::Expression(body) => self.deepest([&**body]),
            LambdaBody::Block(statements) => {
                self.deepest(statements.iter().filter_map(|statement| match statement {
                    FunctionStatement::Expression(expression) => Some(expression),
                    FunctionStatement::Return(expression) => expression.as_ref(),
                }))
            }
        }
    }
}
