/**
 * Binding Expression Serializer
 *
 * Renders AST back to source text. A parsed binding list serializes to its
 * canonical object-literal form: `{'text': name, 'visible': count > 0}`.
 */
use super::ast::*;

/// Serialize an expression AST to source text
pub fn serialize(ast: &AST) -> String {
    ast.visit(&mut SerializeExpressionVisitor)
}

/// Serialize a binding list to its canonical object-literal form
pub fn serialize_bindings(bindings: &[BindingDeclaration]) -> String {
    let mut visitor = SerializeExpressionVisitor;
    let pairs: Vec<String> = bindings
        .iter()
        .map(|binding| {
            let value = match &binding.value {
                Some(value) => value.visit(&mut visitor),
                None => "undefined".to_string(),
            };
            format!("{}: {}", quote_string(binding.name()), value)
        })
        .collect();
    format!("{{{}}}", pairs.join(", "))
}

fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}

fn escape_template_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

struct SerializeExpressionVisitor;

impl SerializeExpressionVisitor {
    fn join(&mut self, expressions: &[AST]) -> String {
        expressions
            .iter()
            .map(|e| e.visit(self))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl AstVisitor for SerializeExpressionVisitor {
    type Result = String;

    fn visit_empty(&mut self, _ast: &EmptyExpr) -> String {
        String::new()
    }

    fn visit_implicit_receiver(&mut self, _ast: &ImplicitReceiver) -> String {
        String::new()
    }

    fn visit_conditional(&mut self, ast: &Conditional) -> String {
        format!(
            "{} ? {} : {}",
            ast.condition.visit(self),
            ast.true_exp.visit(self),
            ast.false_exp.visit(self)
        )
    }

    fn visit_property_read(&mut self, ast: &PropertyRead) -> String {
        let receiver = ast.receiver.visit(self);
        if receiver.is_empty() {
            ast.name.clone()
        } else {
            format!("{}.{}", receiver, ast.name)
        }
    }

    fn visit_safe_property_read(&mut self, ast: &SafePropertyRead) -> String {
        format!("{}?.{}", ast.receiver.visit(self), ast.name)
    }

    fn visit_keyed_read(&mut self, ast: &KeyedRead) -> String {
        format!("{}[{}]", ast.receiver.visit(self), ast.key.visit(self))
    }

    fn visit_safe_keyed_read(&mut self, ast: &SafeKeyedRead) -> String {
        format!("{}?.[{}]", ast.receiver.visit(self), ast.key.visit(self))
    }

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) -> String {
        match ast {
            LiteralPrimitive::String { value, .. } => quote_string(value),
            LiteralPrimitive::Number { value, .. } => format_number(*value),
            LiteralPrimitive::Boolean { value, .. } => value.to_string(),
            LiteralPrimitive::Null { .. } => "null".to_string(),
            LiteralPrimitive::Undefined { .. } => "undefined".to_string(),
        }
    }

    fn visit_literal_array(&mut self, ast: &LiteralArray) -> String {
        format!("[{}]", self.join(&ast.expressions))
    }

    fn visit_literal_map(&mut self, ast: &LiteralMap) -> String {
        let pairs: Vec<String> = ast
            .keys
            .iter()
            .zip(ast.values.iter())
            .map(|(key, value)| {
                let key_str = if key.quoted {
                    quote_string(&key.key)
                } else {
                    key.key.clone()
                };
                format!("{}: {}", key_str, value.visit(self))
            })
            .collect();
        format!("{{{}}}", pairs.join(", "))
    }

    fn visit_binary(&mut self, ast: &Binary) -> String {
        format!(
            "{} {} {}",
            ast.left.visit(self),
            ast.operation,
            ast.right.visit(self)
        )
    }

    fn visit_prefix_not(&mut self, ast: &PrefixNot) -> String {
        format!("!{}", ast.expression.visit(self))
    }

    fn visit_unary(&mut self, ast: &Unary) -> String {
        let operand = ast.expr.visit(self);
        // Keep `- -x` from collapsing into a decrement-looking `--x`
        if operand.starts_with(ast.operator.as_str()) {
            format!("{} {}", ast.operator, operand)
        } else {
            format!("{}{}", ast.operator, operand)
        }
    }

    fn visit_typeof(&mut self, ast: &TypeofExpression) -> String {
        format!("typeof {}", ast.expression.visit(self))
    }

    fn visit_void(&mut self, ast: &VoidExpression) -> String {
        format!("void {}", ast.expression.visit(self))
    }

    fn visit_call(&mut self, ast: &Call) -> String {
        let trailing = if ast.has_trailing_comma { ", " } else { "" };
        format!(
            "{}({}{})",
            ast.receiver.visit(self),
            self.join(&ast.args),
            trailing
        )
    }

    fn visit_safe_call(&mut self, ast: &SafeCall) -> String {
        let trailing = if ast.has_trailing_comma { ", " } else { "" };
        format!(
            "{}?.({}{})",
            ast.receiver.visit(self),
            self.join(&ast.args),
            trailing
        )
    }

    fn visit_template_literal(&mut self, ast: &TemplateLiteral) -> String {
        let mut result = String::from("`");
        for (idx, elem) in ast.elements.iter().enumerate() {
            result.push_str(&escape_template_text(&elem.text));
            if let Some(expression) = ast.expressions.get(idx) {
                result.push_str("${");
                result.push_str(&expression.visit(self));
                result.push('}');
            }
        }
        result.push('`');
        result
    }

    fn visit_parenthesized(&mut self, ast: &ParenthesizedExpression) -> String {
        format!("({})", ast.expression.visit(self))
    }

    fn visit_lambda(&mut self, ast: &Lambda) -> String {
        match &ast.body {
            LambdaBody::Expression(body) => {
                let body = body.visit(self);
                // An object body needs parens to not read as a block
                let body = if body.starts_with('{') {
                    format!("({})", body)
                } else {
                    body
                };
                format!("({}) => {}", ast.params.join(", "), body)
            }
            LambdaBody::Block(statements) => {
                let statements: Vec<String> = statements
                    .iter()
                    .map(|statement| match statement {
                        FunctionStatement::Expression(e) => e.visit(self),
                        FunctionStatement::Return(Some(e)) => format!("return {}", e.visit(self)),
                        FunctionStatement::Return(None) => "return".to_string(),
                    })
                    .collect();
                if statements.is_empty() {
                    format!("function ({}) {{ }}", ast.params.join(", "))
                } else {
                    format!(
                        "function ({}) {{ {}; }}",
                        ast.params.join(", "),
                        statements.join("; ")
                    )
                }
            }
        }
    }
}
