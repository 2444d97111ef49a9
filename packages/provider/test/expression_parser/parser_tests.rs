/**
 * Parser Tests
 *
 * Binding list splitting, expression precedence and rejected syntax
 */

#[cfg(test)]
mod tests {
    use binding_provider::expression_parser::{ast::*, parser::Parser, serialize};
    use binding_provider::ParseError;

    fn parse_bindings(text: &str) -> Vec<BindingDeclaration> {
        Parser::new()
            .parse_bindings(text)
            .unwrap_or_else(|e| panic!("{} should parse: {}", text, e))
    }

    fn parse_binding(text: &str) -> AST {
        Parser::new()
            .parse_binding(text)
            .unwrap_or_else(|e| panic!("{} should parse: {}", text, e))
    }

    fn parse_error(text: &str) -> ParseError {
        match Parser::new().parse_bindings(text) {
            Ok(bindings) => panic!("{} should not parse, got {:?}", text, bindings),
            Err(error) => error,
        }
    }

    fn names(bindings: &[BindingDeclaration]) -> Vec<&str> {
        bindings.iter().map(|b| b.name()).collect()
    }

    mod binding_list {
        use super::*;

        #[test]
        fn should_parse_zero_bindings() {
            assert!(parse_bindings("").is_empty());
            assert!(parse_bindings("   ").is_empty());
        }

        #[test]
        fn should_parse_single_binding_without_trailing_separator() {
            let bindings = parse_bindings("text: name");
            assert_eq!(names(&bindings), vec!["text"]);
            assert_eq!(bindings[0].key_span, ParseSpan::new(0, 4));
            assert_eq!(
                bindings[0].value.as_ref().and_then(AST::as_scope_name),
                Some("name")
            );
        }

        #[test]
        fn should_tolerate_trailing_comma() {
            assert_eq!(names(&parse_bindings("a: 1, b: 2,")), vec!["a", "b"]);
        }

        #[test]
        fn should_split_only_at_top_level_separators() {
            assert_eq!(names(&parse_bindings("x: {a:1, b:2}, y: 3")), vec!["x", "y"]);
            assert_eq!(names(&parse_bindings("x: f(1, 2), y: [1, 2]")), vec!["x", "y"]);
            assert_eq!(names(&parse_bindings("x: a ? b : c, y: 1")), vec!["x", "y"]);
            assert_eq!(names(&parse_bindings("x: 'a:b, c', y: 1")), vec!["x", "y"]);
            assert_eq!(
                names(&parse_bindings(
                    "click: function (e) { log(e, 1); return true; }, text: `${a}, ${b}`"
                )),
                vec!["click", "text"]
            );
        }

        #[test]
        fn should_accept_bare_keys() {
            let bindings = parse_bindings("visible, text: name");
            assert_eq!(names(&bindings), vec!["visible", "text"]);
            assert!(bindings[0].value.is_none());
        }

        #[test]
        fn should_accept_quoted_keyword_and_number_keys() {
            let bindings = parse_bindings("'my-binding': 1, \"if\": a, default: 2, 3: b");
            assert_eq!(names(&bindings), vec!["my-binding", "if", "default", "3"]);
            assert!(bindings[0].key.quoted);
            assert!(!bindings[2].key.quoted);
        }
    }

    mod expressions {
        use super::*;

        #[test]
        fn should_respect_multiplicative_precedence() {
            match parse_binding("a + b * c") {
                AST::Binary(add) => {
                    assert_eq!(add.operation, "+");
                    match *add.right {
                        AST::Binary(ref mul) => assert_eq!(mul.operation, "*"),
                        ref other => panic!("Expected multiplication, got {:?}", other),
                    }
                }
                other => panic!("Expected binary, got {:?}", other),
            }
        }

        #[test]
        fn should_bind_logical_and_tighter_than_or() {
            match parse_binding("a || b && c") {
                AST::Binary(or) => {
                    assert_eq!(or.operation, "||");
                    assert!(matches!(*or.right, AST::Binary(ref and) if and.operation == "&&"));
                }
                other => panic!("Expected binary, got {:?}", other),
            }
        }

        #[test]
        fn should_make_exponent_right_associative() {
            match parse_binding("2 ** 3 ** 2") {
                AST::Binary(pow) => {
                    assert!(matches!(*pow.left, AST::LiteralPrimitive(_)));
                    assert!(matches!(*pow.right, AST::Binary(ref inner) if inner.operation == "**"));
                }
                other => panic!("Expected binary, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_in_operator() {
            assert!(matches!(parse_binding("'a' in obj"), AST::Binary(ref b) if b.operation == "in"));
        }

        #[test]
        fn should_parse_prefix_operators() {
            assert!(matches!(parse_binding("!a"), AST::PrefixNot(_)));
            assert!(matches!(parse_binding("-a"), AST::Unary(ref u) if u.operator == "-"));
            assert!(matches!(parse_binding("typeof a"), AST::TypeofExpression(_)));
            assert!(matches!(parse_binding("void 0"), AST::VoidExpression(_)));
        }

        #[test]
        fn should_parse_member_chains() {
            assert!(matches!(parse_binding("a.b"), AST::PropertyRead(_)));
            assert!(matches!(parse_binding("a?.b"), AST::SafePropertyRead(_)));
            assert!(matches!(parse_binding("a[0]"), AST::KeyedRead(_)));
            assert!(matches!(parse_binding("a?.[0]"), AST::SafeKeyedRead(_)));
            assert!(matches!(parse_binding("a(1)"), AST::Call(_)));
            assert!(matches!(parse_binding("a?.(1)"), AST::SafeCall(_)));
            assert!(matches!(parse_binding("$data.default"), AST::PropertyRead(ref p) if p.name == "default"));
        }

        #[test]
        fn should_record_trailing_comma_in_calls() {
            match parse_binding("f(a, b,)") {
                AST::Call(call) => {
                    assert_eq!(call.args.len(), 2);
                    assert!(call.has_trailing_comma);
                }
                other => panic!("Expected call, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_object_shorthand() {
            match parse_binding("{a, 'b-c': 2}") {
                AST::LiteralMap(map) => {
                    assert_eq!(map.keys.len(), 2);
                    assert_eq!(map.values[0].as_scope_name(), Some("a"));
                    assert!(map.keys[1].quoted);
                }
                other => panic!("Expected object literal, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_template_literals() {
            match parse_binding("`Hello ${name}!`") {
                AST::TemplateLiteral(template) => {
                    assert_eq!(template.elements.len(), 2);
                    assert_eq!(template.expressions.len(), 1);
                    assert_eq!(template.elements[1].text, "!");
                }
                other => panic!("Expected template literal, got {:?}", other),
            }
        }
    }

    mod functions {
        use super::*;

        fn lambda(text: &str) -> Lambda {
            match parse_binding(text) {
                AST::Lambda(lambda) => lambda,
                other => panic!("Expected function, got {:?}", other),
            }
        }

        #[test]
        fn should_parse_arrow_functions() {
            assert_eq!(lambda("x => x + 1").params.as_slice(), ["x"]);
            assert_eq!(lambda("(a, b) => a + b").params.as_slice(), ["a", "b"]);
            assert!(lambda("() => 1").params.is_empty());
        }

        #[test]
        fn should_not_confuse_parentheses_with_arrow_parameters() {
            assert!(matches!(parse_binding("(a)"), AST::ParenthesizedExpression(_)));
            assert!(matches!(parse_binding("(a) + 1"), AST::Binary(_)));
            assert!(Parser::new().parse_binding("(a, b)").is_err());
        }

        #[test]
        fn should_parse_function_expressions() {
            let f = lambda("function (item) { log(item); return item.id; }");
            assert_eq!(f.params.as_slice(), ["item"]);
            match f.body {
                LambdaBody::Block(statements) => {
                    assert_eq!(statements.len(), 2);
                    assert!(matches!(statements[1], FunctionStatement::Return(Some(_))));
                }
                LambdaBody::Expression(_) => panic!("Expected block body"),
            }
        }

        #[test]
        fn should_accept_named_and_empty_functions() {
            assert!(lambda("function handler() { }").params.is_empty());
            match lambda("function () { return }").body {
                LambdaBody::Block(statements) => {
                    assert!(matches!(statements[..], [FunctionStatement::Return(None)]))
                }
                LambdaBody::Expression(_) => panic!("Expected block body"),
            }
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unclosed_parenthesis() {
            let error = parse_error("x: (");
            assert_eq!(error.message, "Unexpected end of input");
            assert_eq!(error.span.start, 4);
            assert_eq!(error.input, "x: (");
            assert_eq!(
                error.to_string(),
                "Parser Error: Unexpected end of input at column 4 in [x: (]"
            );
        }

        #[test]
        fn should_reject_assignments() {
            assert!(parse_error("value: a = 1").message.contains("assignments"));
        }

        #[test]
        fn should_reject_unsupported_syntax() {
            parse_error("x: /re/");
            parse_error("x: a | b");
            parse_error("x: a & b");
            parse_error("x: this");
            parse_error("x: new Foo()");
        }

        #[test]
        fn should_reject_missing_separator() {
            let error = parse_error("x: 1 y: 2");
            assert!(error.message.contains("expected ','"), "{}", error.message);
        }

        #[test]
        fn should_reject_empty_entries() {
            let error = parse_error("a: 1,, b: 2");
            assert!(error.message.starts_with("Expected binding name"));
        }

        #[test]
        fn should_surface_lexer_errors() {
            let error = parse_error("x: 'abc");
            assert!(error.message.contains("Unterminated quote"));
        }

        #[test]
        fn should_reject_missing_value_after_colon() {
            parse_error("x:");
        }

        #[test]
        fn should_count_columns_in_characters() {
            let error = parse_error("title: 'héllo' + (");
            assert_eq!(error.span.start, 19);
            assert_eq!(error.column(), 18);
            assert!(error.to_string().contains("at column 18"), "{}", error);

            let error = parse_error("x: 'é' # 1");
            assert!(error.message.contains("at column 7"), "{}", error.message);
        }

        #[test]
        fn should_reject_deep_nesting() {
            let parens = format!("x: {}1{}", "(".repeat(2000), ")".repeat(2000));
            let members = format!("x: a{}", ".b".repeat(2000));
            let sums = format!("x: 1{}", " + 1".repeat(2000));
            let nots = format!("x: {}a", "!".repeat(2000));

            for text in [parens, members, sums, nots] {
                let error = parse_error(&text);
                assert_eq!(error.message, "Expression nested too deeply");
            }
            parse_binding(&format!("{}a{}", "(".repeat(40), ")".repeat(40)));
        }
    }

    #[test]
    fn should_serialize_what_it_parsed() {
        assert_eq!(serialize(&parse_binding("a?.b[c](1, 'x')")), "a?.b[c](1, 'x')");
    }
}
