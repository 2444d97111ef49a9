/**
 * Binding Expression Parser
 *
 * Recursive descent parser for declarative binding annotations. The binding
 * list is parsed straight from the token stream, so commas and colons that
 * belong to nested object literals, calls, conditionals or function bodies
 * never split a binding: only separators at the top level do.
 */
use smallvec::SmallVec;

use super::ast::*;
use super::lexer::{Lexer, Token, TokenType};
use crate::error::{ParseError, ParseResult};

/// Deepest expression nesting accepted in one binding
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parser for binding annotations
#[derive(Debug, Default, Clone)]
pub struct Parser {
    lexer: Lexer,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            lexer: Lexer::new(),
        }
    }

    /// Parse a full annotation: comma-separated `name: expression` pairs.
    ///
    /// Empty or whitespace-only text yields no bindings.
    pub fn parse_bindings(&self, input: &str) -> ParseResult<Vec<BindingDeclaration>> {
        let tokens = self.lexer.tokenize(input);
        let mut parse_ast = ParseAST::new(input, tokens)?;
        parse_ast.parse_binding_list()
    }

    /// Parse a single binding expression (the right-hand side of a pair)
    pub fn parse_binding(&self, input: &str) -> ParseResult<AST> {
        let tokens = self.lexer.tokenize(input);
        let mut parse_ast = ParseAST::new(input, tokens)?;
        let ast = parse_ast.parse_expression()?;

        if let Some(token) = parse_ast.current() {
            return Err(parse_ast.error_at(
                token,
                format!("Unexpected token {}", token.describe()),
            ));
        }
        Ok(ast)
    }
}

/// Internal parser state
struct ParseAST<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    index: usize,
    depth: usize,
}

impl<'a> ParseAST<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> ParseResult<Self> {
        // The lexer stops at its first error, so only the last token can be one.
        if let Some(token) = tokens.last().filter(|token| token.is_error()) {
            return Err(ParseError::new(
                token.str_value.clone(),
                ParseSpan::new(token.index, token.end),
                input,
            ));
        }
        Ok(ParseAST {
            input,
            tokens,
            index: 0,
            depth: 0,
        })
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let at = self.input_index();
        ParseError::new(message, ParseSpan::new(at, at), self.input)
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("Expression nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Chains built in a loop (`a.b.c`, `1 + 2 + 3`) nest without recursing
    fn ensure_depth(&self, ast: &AST) -> ParseResult<()> {
        if ast.depth() > MAX_NESTING_DEPTH {
            return Err(self.error("Expression nested too deeply"));
        }
        Ok(())
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::new(message, ParseSpan::new(token.index, token.end), self.input)
    }

    fn unexpected(&self) -> ParseError {
        match self.current() {
            Some(token) => self.error_at(token, format!("Unexpected token {}", token.describe())),
            None => self.error("Unexpected end of input"),
        }
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.index + offset)
    }

    fn at_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn consume_optional_character(&mut self, code: char) -> bool {
        if self.current().map_or(false, |token| token.is_character(code)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume_optional_operator(&mut self, op: &str) -> bool {
        if self.current().map_or(false, |token| token.is_operator(op)) {
            self.advance();
            return true;
        }
        false
    }

    fn expect_character(&mut self, code: char) -> ParseResult<()> {
        if self.consume_optional_character(code) {
            return Ok(());
        }
        match self.current() {
            Some(token) => Err(self.error_at(
                token,
                format!("Missing expected {} but found {}", code, token.describe()),
            )),
            None => Err(self.error(format!("Missing expected {}", code))),
        }
    }

    fn current_operator(&self, operators: &[&str]) -> Option<String> {
        self.current()
            .filter(|token| token.token_type == TokenType::Operator)
            .filter(|token| operators.contains(&token.str_value.as_str()))
            .map(|token| token.str_value.clone())
    }

    /// bindings := ( entry ( ',' entry )* ','? )?
    fn parse_binding_list(&mut self) -> ParseResult<Vec<BindingDeclaration>> {
        let mut bindings = Vec::new();

        while !self.at_end() {
            let key_start = self.input_index();
            let key = self.parse_property_key("binding name")?;
            let key_span = self.span(key_start);

            let value = if self.consume_optional_character(':') {
                Some(self.parse_expression()?)
            } else {
                None
            };

            bindings.push(BindingDeclaration {
                key,
                key_span,
                value,
            });

            if !self.consume_optional_character(',') && !self.at_end() {
                let token = self.current().cloned();
                return Err(match token {
                    Some(token) => self.error_at(
                        &token,
                        format!("Unexpected token {}, expected ','", token.describe()),
                    ),
                    None => self.unexpected(),
                });
            }
        }

        Ok(bindings)
    }

    /// Key of a binding or of an object literal entry
    fn parse_property_key(&mut self, what: &str) -> ParseResult<LiteralMapKey> {
        let key = match self.current() {
            Some(token) if token.is_identifier() || token.is_keyword() || token.is_number() => {
                LiteralMapKey {
                    key: token.str_value.clone(),
                    quoted: false,
                }
            }
            Some(token) if token.is_string() => LiteralMapKey {
                key: token.str_value.clone(),
                quoted: true,
            },
            Some(token) => {
                return Err(self.error_at(
                    token,
                    format!("Expected {} but found {}", what, token.describe()),
                ))
            }
            None => return Err(self.error(format!("Expected {}", what))),
        };
        self.advance();
        Ok(key)
    }

    /// A full expression; assignments are rejected
    fn parse_expression(&mut self) -> ParseResult<AST> {
        self.nested(|this| {
            let result = this.parse_conditional()?;

            if this.current().map_or(false, |token| token.is_operator("=")) {
                return Err(this.error("Bindings cannot contain assignments"));
            }
            Ok(result)
        })
    }

    /// Parse conditional/ternary expression (e.g., `a ? b : c`)
    fn parse_conditional(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let result = self.parse_logical_or()?;

        if self.consume_optional_operator("?") {
            let true_exp = self.parse_expression()?;
            self.expect_character(':')?;
            let false_exp = self.parse_expression()?;

            return Ok(AST::Conditional(Conditional {
                span: self.span(start),
                condition: Box::new(result),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            }));
        }

        Ok(result)
    }

    /// Left-associative binary level: `operand (op operand)*`
    fn parse_binary_level(
        &mut self,
        operators: &[&str],
        operand: fn(&mut Self) -> ParseResult<AST>,
    ) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = operand(self)?;

        while let Some(operation) = self.current_operator(operators) {
            self.advance();
            let right = operand(self)?;
            result = AST::Binary(Binary {
                span: self.span(start),
                operation,
                left: Box::new(result),
                right: Box::new(right),
            });
            self.ensure_depth(&result)?;
        }

        Ok(result)
    }

    fn parse_logical_or(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["&&"], Self::parse_nullish_coalescing)
    }

    fn parse_nullish_coalescing(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["??"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["==", "!=", "===", "!=="], Self::parse_relational)
    }

    /// Parse relational operators (<, >, <=, >=, in)
    fn parse_relational(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_additive()?;

        loop {
            let operation = match self.current() {
                Some(token) if token.is_keyword_named("in") => "in".to_string(),
                _ => match self.current_operator(&["<", ">", "<=", ">="]) {
                    Some(operation) => operation,
                    None => break,
                },
            };
            self.advance();
            let right = self.parse_additive()?;
            result = AST::Binary(Binary {
                span: self.span(start),
                operation,
                left: Box::new(result),
                right: Box::new(right),
            });
            self.ensure_depth(&result)?;
        }

        Ok(result)
    }

    fn parse_additive(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<AST> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_exponentiation)
    }

    /// Parse exponentiation operator (**), right associative
    fn parse_exponentiation(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let result = self.parse_prefix()?;

        if self.consume_optional_operator("**") {
            let right = self.nested(Self::parse_exponentiation)?;
            return Ok(AST::Binary(Binary {
                span: self.span(start),
                operation: "**".to_string(),
                left: Box::new(result),
                right: Box::new(right),
            }));
        }

        Ok(result)
    }

    /// Parse prefix operators (!, -, +, typeof, void)
    fn parse_prefix(&mut self) -> ParseResult<AST> {
        let start = self.input_index();

        if self.consume_optional_operator("!") {
            let expr = self.nested(Self::parse_prefix)?;
            return Ok(AST::PrefixNot(PrefixNot {
                span: self.span(start),
                expression: Box::new(expr),
            }));
        }

        if let Some(operator) = self.current_operator(&["+", "-"]) {
            self.advance();
            let expr = self.nested(Self::parse_prefix)?;
            return Ok(AST::Unary(Unary {
                span: self.span(start),
                operator,
                expr: Box::new(expr),
            }));
        }

        if self.current().map_or(false, |token| token.is_keyword_named("typeof")) {
            self.advance();
            let expr = self.nested(Self::parse_prefix)?;
            return Ok(AST::TypeofExpression(TypeofExpression {
                span: self.span(start),
                expression: Box::new(expr),
            }));
        }

        if self.current().map_or(false, |token| token.is_keyword_named("void")) {
            self.advance();
            let expr = self.nested(Self::parse_prefix)?;
            return Ok(AST::VoidExpression(VoidExpression {
                span: self.span(start),
                expression: Box::new(expr),
            }));
        }

        self.parse_call_chain()
    }

    /// Parse call chain (handles property access, method calls, safe navigation)
    fn parse_call_chain(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;

        loop {
            if self.consume_optional_operator("?.") {
                if self.consume_optional_character('(') {
                    let (args, has_trailing_comma) = self.parse_call_arguments()?;
                    result = AST::SafeCall(SafeCall {
                        span: self.span(start),
                        receiver: Box::new(result),
                        args,
                        has_trailing_comma,
                    });
                } else if self.consume_optional_character('[') {
                    let key = self.parse_expression()?;
                    self.expect_character(']')?;
                    result = AST::SafeKeyedRead(SafeKeyedRead {
                        span: self.span(start),
                        receiver: Box::new(result),
                        key: Box::new(key),
                    });
                } else {
                    result = self.parse_access_member(result, start, true)?;
                }
            } else if self.consume_optional_character('.') {
                result = self.parse_access_member(result, start, false)?;
            } else if self.consume_optional_character('[') {
                let key = self.parse_expression()?;
                self.expect_character(']')?;
                result = AST::KeyedRead(KeyedRead {
                    span: self.span(start),
                    receiver: Box::new(result),
                    key: Box::new(key),
                });
            } else if self.consume_optional_character('(') {
                let (args, has_trailing_comma) = self.parse_call_arguments()?;
                result = AST::Call(Call {
                    span: self.span(start),
                    receiver: Box::new(result),
                    args,
                    has_trailing_comma,
                });
            } else {
                break;
            }
            self.ensure_depth(&result)?;
        }

        Ok(result)
    }

    /// Parse primary expression (literals, identifiers, parentheses, arrays, objects, functions)
    fn parse_primary(&mut self) -> ParseResult<AST> {
        let start = self.input_index();

        let token = match self.current() {
            Some(token) => token.clone(),
            None => return Err(self.unexpected()),
        };

        if token.is_template_literal_part() || token.is_template_literal_end() {
            return self.parse_template_literal();
        }

        if token.is_character('(') {
            if self.is_arrow_parameter_list() {
                return self.parse_arrow_function();
            }
            self.advance();
            let expr = self.parse_expression()?;
            self.expect_character(')')?;
            return Ok(AST::ParenthesizedExpression(ParenthesizedExpression {
                span: self.span(start),
                expression: Box::new(expr),
            }));
        }

        if token.is_character('[') {
            return self.parse_literal_array();
        }

        if token.is_character('{') {
            return self.parse_literal_map();
        }

        if token.is_keyword() {
            let literal = match token.str_value.as_str() {
                "null" => LiteralPrimitive::null(ParseSpan::new(token.index, token.end)),
                "undefined" => LiteralPrimitive::undefined(ParseSpan::new(token.index, token.end)),
                "true" => LiteralPrimitive::boolean(ParseSpan::new(token.index, token.end), true),
                "false" => LiteralPrimitive::boolean(ParseSpan::new(token.index, token.end), false),
                "function" => return self.parse_function_expression(),
                _ => {
                    return Err(self.error_at(
                        &token,
                        format!("Unexpected {}", token.describe()),
                    ))
                }
            };
            self.advance();
            return Ok(AST::LiteralPrimitive(literal));
        }

        if token.is_identifier() {
            if self.peek(1).map_or(false, |next| next.is_operator("=>")) {
                return self.parse_arrow_function();
            }
            let receiver = AST::ImplicitReceiver(ImplicitReceiver {
                span: ParseSpan::new(start, start),
            });
            return self.parse_access_member(receiver, start, false);
        }

        if token.is_number() {
            self.advance();
            return Ok(AST::LiteralPrimitive(LiteralPrimitive::number(
                self.span(start),
                token.num_value,
            )));
        }

        if token.is_string() {
            self.advance();
            return Ok(AST::LiteralPrimitive(LiteralPrimitive::string(
                self.span(start),
                token.str_value,
            )));
        }

        Err(self.unexpected())
    }

    /// Parse property access after `.` / `?.` (or a bare identifier on the implicit receiver)
    fn parse_access_member(&mut self, receiver: AST, start: usize, is_safe: bool) -> ParseResult<AST> {
        let (name, name_span) = match self.current() {
            Some(token) if token.is_identifier() || token.is_keyword() => (
                token.str_value.clone(),
                ParseSpan::new(token.index, token.end),
            ),
            Some(token) => {
                return Err(self.error_at(
                    token,
                    format!("Unexpected {}, expected identifier or keyword", token.describe()),
                ))
            }
            None => return Err(self.error("Expected identifier or keyword")),
        };
        self.advance();

        let receiver = Box::new(receiver);
        let span = self.span(start);
        if is_safe {
            Ok(AST::SafePropertyRead(SafePropertyRead {
                span,
                name_span,
                receiver,
                name,
            }))
        } else {
            Ok(AST::PropertyRead(PropertyRead {
                span,
                name_span,
                receiver,
                name,
            }))
        }
    }

    /// Parse array literal [1, 2, 3]
    fn parse_literal_array(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        self.expect_character('[')?;

        let mut expressions = Vec::new();
        if !self.consume_optional_character(']') {
            loop {
                expressions.push(self.parse_expression()?);

                if self.consume_optional_character(',') {
                    if self.consume_optional_character(']') {
                        break;
                    }
                } else {
                    self.expect_character(']')?;
                    break;
                }
            }
        }

        Ok(AST::LiteralArray(LiteralArray {
            span: self.span(start),
            expressions,
        }))
    }

    /// Parse object literal {a: 1, 'b': 2, c}
    fn parse_literal_map(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        self.expect_character('{')?;

        let mut keys = Vec::new();
        let mut values = Vec::new();

        if !self.consume_optional_character('}') {
            loop {
                let key_start = self.input_index();
                let key = self.parse_property_key("property name")?;

                if self.consume_optional_character(':') {
                    values.push(self.parse_expression()?);
                } else {
                    // Property shorthand: {a} is equivalent to {a: a}
                    let key_span = self.span(key_start);
                    values.push(AST::PropertyRead(PropertyRead {
                        span: key_span,
                        name_span: key_span,
                        receiver: Box::new(AST::ImplicitReceiver(ImplicitReceiver {
                            span: ParseSpan::new(key_start, key_start),
                        })),
                        name: key.key.clone(),
                    }));
                }
                keys.push(key);

                if self.consume_optional_character(',') {
                    if self.consume_optional_character('}') {
                        break;
                    }
                } else {
                    self.expect_character('}')?;
                    break;
                }
            }
        }

        Ok(AST::LiteralMap(LiteralMap {
            span: self.span(start),
            keys,
            values,
        }))
    }

    /// Parse call arguments after the opening paren, consuming the closing one
    fn parse_call_arguments(&mut self) -> ParseResult<(Vec<AST>, bool)> {
        let mut args = Vec::new();
        let mut has_trailing_comma = false;

        while !self.current().map_or(false, |token| token.is_character(')')) {
            args.push(self.parse_expression()?);

            if !self.consume_optional_character(',') {
                break;
            }
            if self.current().map_or(false, |token| token.is_character(')')) {
                has_trailing_comma = true;
            }
        }
        self.expect_character(')')?;

        Ok((args, has_trailing_comma))
    }

    /// Whether the tokens at the cursor read `( ident, ... ) =>`
    fn is_arrow_parameter_list(&self) -> bool {
        let mut offset = 1;
        let mut expect_name = true;
        loop {
            match self.peek(offset) {
                Some(token) if token.is_character(')') => {
                    return self.peek(offset + 1).map_or(false, |next| next.is_operator("=>"));
                }
                Some(token) if expect_name && token.is_identifier() => expect_name = false,
                Some(token) if !expect_name && token.is_character(',') => expect_name = true,
                _ => return false,
            }
            offset += 1;
        }
    }

    /// Parameter names up to and including the closing paren
    fn parse_parameter_list(&mut self) -> ParseResult<SmallVec<[String; 2]>> {
        self.expect_character('(')?;
        let mut params = SmallVec::new();
        while !self.consume_optional_character(')') {
            match self.current() {
                Some(token) if token.is_identifier() => params.push(token.str_value.clone()),
                _ => return Err(self.unexpected()),
            }
            self.advance();
            if !self.consume_optional_character(',') {
                self.expect_character(')')?;
                break;
            }
        }
        Ok(params)
    }

    /// `x => expr` or `(a, b) => expr`
    fn parse_arrow_function(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let params = match self.current() {
            Some(token) if token.is_identifier() => {
                let mut params = SmallVec::new();
                params.push(token.str_value.clone());
                self.advance();
                params
            }
            _ => self.parse_parameter_list()?,
        };

        if !self.consume_optional_operator("=>") {
            return Err(self.unexpected());
        }
        let body = self.parse_expression()?;

        Ok(AST::Lambda(Lambda {
            span: self.span(start),
            params,
            body: LambdaBody::Expression(Box::new(body)),
        }))
    }

    /// `function [name] (params) { statement; ... }`
    fn parse_function_expression(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        self.advance();

        if self.current().map_or(false, |token| token.is_identifier()) {
            self.advance();
        }
        let params = self.parse_parameter_list()?;
        self.expect_character('{')?;

        let mut statements = Vec::new();
        loop {
            while self.consume_optional_character(';') {}
            if self.consume_optional_character('}') {
                break;
            }

            let statement = if self.current().map_or(false, |token| token.is_keyword_named("return")) {
                self.advance();
                let ends_here = self
                    .current()
                    .map_or(true, |token| token.is_character(';') || token.is_character('}'));
                if ends_here {
                    FunctionStatement::Return(None)
                } else {
                    FunctionStatement::Return(Some(self.parse_expression()?))
                }
            } else {
                FunctionStatement::Expression(self.parse_expression()?)
            };
            statements.push(statement);

            if !self.consume_optional_character(';') {
                self.expect_character('}')?;
                break;
            }
        }

        Ok(AST::Lambda(Lambda {
            span: self.span(start),
            params,
            body: LambdaBody::Block(statements),
        }))
    }

    /// Parse template literal: `text ${expr} text`
    fn parse_template_literal(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut elements = Vec::new();
        let mut expressions = Vec::new();

        loop {
            let token = match self.current() {
                Some(token) if token.is_template_literal_part() || token.is_template_literal_end() => {
                    token.clone()
                }
                _ => return Err(self.unexpected()),
            };
            elements.push(TemplateLiteralElement {
                span: ParseSpan::new(token.index, token.end),
                text: token.str_value.clone(),
            });
            self.advance();

            if token.is_template_literal_end() {
                break;
            }

            if !self.current().map_or(false, |t| t.is_template_literal_interpolation_start()) {
                return Err(self.unexpected());
            }
            self.advance();
            expressions.push(self.parse_expression()?);
            self.expect_character('}')?;
        }

        Ok(AST::TemplateLiteral(TemplateLiteral {
            span: self.span(start),
            elements,
            expressions,
        }))
    }

    // Helper methods
    fn input_index(&self) -> usize {
        self.current().map(|t| t.index).unwrap_or(self.input.len())
    }

    fn span(&self, start: usize) -> ParseSpan {
        // End at the last consumed token so trailing whitespace stays out of the span.
        let end = if self.index > 0 && self.index <= self.tokens.len() {
            self.tokens[self.index - 1].end
        } else {
            self.input_index()
        };
        ParseSpan::new(start, end)
    }
}
