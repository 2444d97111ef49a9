/**
 * Serializer Tests
 *
 * Canonical rendering of expressions and binding lists
 */

#[cfg(test)]
mod tests {
    use binding_provider::expression_parser::{parser::Parser, rewrite_bindings, serialize};

    fn check(text: &str, expected: &str) {
        let ast = Parser::new()
            .parse_binding(text)
            .unwrap_or_else(|e| panic!("{} should parse: {}", text, e));
        assert_eq!(serialize(&ast), expected);
    }

    #[test]
    fn should_normalize_whitespace_and_quotes() {
        check("a+b*  c", "a + b * c");
        check("\"x\"", "'x'");
        check("'it\\'s'", "'it\\'s'");
        check("1.50", "1.5");
        check("{ a:1,'b c':[1,2] }", "{a: 1, 'b c': [1, 2]}");
    }

    #[test]
    fn should_keep_parentheses_and_prefixes() {
        check("(a + b) * c", "(a + b) * c");
        check("- -a", "- -a");
        check("!(a && b)", "!(a && b)");
        check("typeof a === 'string'", "typeof a === 'string'");
    }

    #[test]
    fn should_serialize_functions() {
        check("x=>x.id", "(x) => x.id");
        check("() => ({a: 1})", "() => ({a: 1})");
        check(
            "function(e){ log(e) ; return false }",
            "function (e) { log(e); return false; }",
        );
    }

    #[test]
    fn should_serialize_template_literals() {
        check("`a ${b} c`", "`a ${b} c`");
    }

    #[test]
    fn should_rewrite_bindings_to_object_literal() {
        assert_eq!(
            rewrite_bindings("text: name, visible: count > 0").unwrap(),
            "{'text': name, 'visible': count > 0}"
        );
        assert_eq!(rewrite_bindings("").unwrap(), "{}");
        assert_eq!(
            rewrite_bindings("visible, 'data-x': 1").unwrap(),
            "{'visible': undefined, 'data-x': 1}"
        );
    }

    #[test]
    fn should_produce_reparseable_output() {
        let canonical = rewrite_bindings("x: {a:1, b:2}, y: f(1, `${z}`)").unwrap();
        let inner = canonical.trim_start_matches('{').trim_end_matches('}');
        // The canonical body is itself a valid binding list
        let reparsed = Parser::new().parse_bindings(inner).unwrap();
        assert_eq!(reparsed.len(), 2);
    }
}
