/**
 * Interpreter Tests
 *
 * JavaScript-like evaluation of binding expressions against a composed scope
 */
#[path = "utils/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use indexmap::IndexMap;
    use serde_json::json;

    use super::utils::{element, root_context};
    use binding_provider::expression_parser::Parser;
    use binding_provider::interpreter::evaluate;
    use binding_provider::{compose, BindingContext, EvaluationError, Scope, Value};

    fn eval_in(text: &str, context: &Arc<BindingContext>) -> Result<Value, EvaluationError> {
        let ast = Parser::new()
            .parse_binding(text)
            .unwrap_or_else(|e| panic!("{} should parse: {}", text, e));
        let scope = compose(context, &element("x: 1"));
        evaluate(&ast, &scope)
    }

    fn eval(text: &str, data: serde_json::Value) -> Value {
        eval_in(text, &root_context(data)).unwrap_or_else(|e| panic!("{} failed: {}", text, e))
    }

    fn eval_err(text: &str, data: serde_json::Value) -> EvaluationError {
        match eval_in(text, &root_context(data)) {
            Ok(value) => panic!("{} should fail, got {:?}", text, value),
            Err(error) => error,
        }
    }

    fn json_of(value: Value) -> serde_json::Value {
        value.to_json()
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn should_evaluate_numeric_operators() {
            assert_eq!(eval("1 + 2 * 3", json!({})), Value::from(7));
            assert_eq!(eval("(1 + 2) * 3", json!({})), Value::from(9));
            assert_eq!(eval("7 % 4", json!({})), Value::from(3));
            assert_eq!(eval("2 ** 3 ** 2", json!({})), Value::from(512));
            assert_eq!(eval("-a + +'2'", json!({"a": 5})), Value::from(-3));
            assert!(eval("1 / 0", json!({})).as_f64().unwrap().is_infinite());
        }

        #[test]
        fn should_concatenate_when_a_side_is_a_string() {
            assert_eq!(eval("'a' + 1", json!({})), Value::from("a1"));
            assert_eq!(eval("1 + 2 + 'px'", json!({})), Value::from("3px"));
            assert_eq!(eval("[1, 2] + ''", json!({})), Value::from("1,2"));
        }

        #[test]
        fn should_propagate_nan() {
            assert!(eval("'x' * 2", json!({})).as_f64().unwrap().is_nan());
            assert!(eval("missing - 1", json!({})).as_f64().unwrap().is_nan());
        }
    }

    mod comparison {
        use super::*;

        #[test]
        fn should_distinguish_loose_and_strict_equality() {
            assert_eq!(eval("1 == '1'", json!({})), Value::from(true));
            assert_eq!(eval("1 === '1'", json!({})), Value::from(false));
            assert_eq!(eval("null == undefined", json!({})), Value::from(true));
            assert_eq!(eval("null === undefined", json!({})), Value::from(false));
            assert_eq!(eval("a === a", json!({"a": {}})), Value::from(true));
            assert_eq!(eval("{} === {}", json!({})), Value::from(false));
        }

        #[test]
        fn should_compare_strings_and_numbers() {
            assert_eq!(eval("'b' > 'a'", json!({})), Value::from(true));
            assert_eq!(eval("'10' < 9", json!({})), Value::from(false));
            assert_eq!(eval("count >= 3", json!({"count": 3})), Value::from(true));
            assert_eq!(eval("undefined < 1", json!({})), Value::from(false));
        }

        #[test]
        fn should_evaluate_in_operator() {
            assert_eq!(eval("'a' in obj", json!({"obj": {"a": 1}})), Value::from(true));
            assert_eq!(eval("1 in list", json!({"list": [5]})), Value::from(false));
            assert!(matches!(
                eval_err("'a' in 'abc'", json!({})),
                EvaluationError::TypeError { .. }
            ));
        }
    }

    mod logical {
        use super::*;

        #[test]
        fn should_return_operands() {
            assert_eq!(eval("a || 'fallback'", json!({"a": ""})), Value::from("fallback"));
            assert_eq!(eval("a && a.name", json!({"a": {"name": "n"}})), Value::from("n"));
            assert_eq!(eval("a ?? 0", json!({"a": false})), Value::from(false));
            assert_eq!(eval("a ?? 0", json!({})), Value::from(0));
        }

        #[test]
        fn should_short_circuit() {
            // Reading through undefined on the right side would fail if it were evaluated
            assert_eq!(eval("false && missing.x", json!({})), Value::from(false));
            assert_eq!(eval("true || missing.x", json!({})), Value::from(true));
            assert_eq!(eval("1 ?? missing.x", json!({})), Value::from(1));
            assert_eq!(eval("ok ? 'yes' : missing.x", json!({"ok": true})), Value::from("yes"));
        }

        #[test]
        fn should_evaluate_prefix_operators() {
            assert_eq!(eval("!items.length", json!({"items": []})), Value::from(true));
            assert_eq!(eval("typeof name", json!({"name": "a"})), Value::from("string"));
            assert_eq!(eval("typeof missing", json!({})), Value::from("undefined"));
            assert_eq!(eval("void 1", json!({})), Value::Undefined);
        }
    }

    mod members {
        use super::*;

        #[test]
        fn should_read_nested_members() {
            let data = json!({"user": {"tags": ["a", "b"], "name": "Ann"}, "key": "name"});
            assert_eq!(eval("user.name", data.clone()), Value::from("Ann"));
            assert_eq!(eval("user[key]", data.clone()), Value::from("Ann"));
            assert_eq!(eval("user.tags[1]", data.clone()), Value::from("b"));
            assert_eq!(eval("user.tags.length", data.clone()), Value::from(2));
            assert_eq!(eval("user.missing", data), Value::Undefined);
        }

        #[test]
        fn should_fail_reading_through_undefined() {
            let error = eval_err("user.address.city", json!({"user": {}}));
            assert_eq!(
                error.to_string(),
                "TypeError: Cannot read properties of undefined (reading 'city')"
            );
            let error = eval_err("value[0]", json!({"value": null}));
            assert!(error.to_string().contains("Cannot read properties of null"));
        }

        #[test]
        fn should_short_circuit_safe_navigation() {
            assert_eq!(eval("user?.address.city", json!({})), Value::Undefined);
            assert_eq!(eval("user.address?.city.name", json!({"user": {}})), Value::Undefined);
            assert_eq!(eval("list?.[0]", json!({"list": null})), Value::Undefined);
            assert_eq!(eval("fn?.()", json!({})), Value::Undefined);
            // Parentheses end the optional chain
            assert!(eval_in("(user?.address).city", &root_context(json!({}))).is_err());
        }

        #[test]
        fn should_read_element_and_context_members() {
            let context = root_context(json!({"a": 1}));
            let ast = Parser::new().parse_binding("[$element.id, $element.nodeType, $context.$data.a]").unwrap();
            let node = binding_provider::ElementNode::new("input")
                .with_attribute("id", "email")
                .into_ref();
            let scope = compose(&context, &node);

            assert_eq!(json_of(evaluate(&ast, &scope).unwrap()), json!(["email", 1, 1]));
        }
    }

    mod literals {
        use super::*;

        #[test]
        fn should_build_arrays_and_objects() {
            assert_eq!(
                json_of(eval("{a: 1, b: [x, 'y'], x}", json!({"x": true}))),
                json!({"a": 1, "b": [true, "y"], "x": true})
            );
        }

        #[test]
        fn should_keep_first_position_for_duplicate_keys() {
            let value = eval("{a: 1, b: 2, a: 3}", json!({}));
            let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
            assert_eq!(keys, vec!["a", "b"]);
            assert_eq!(value.member("a"), Value::from(3));
        }

        #[test]
        fn should_interpolate_template_literals() {
            assert_eq!(
                eval("`${count} item${count === 1 ? '' : 's'}`", json!({"count": 2})),
                Value::from("2 items")
            );
        }
    }

    mod functions {
        use super::*;

        fn context_with_functions() -> Arc<BindingContext> {
            let mut data = IndexMap::new();
            data.insert(
                "double".to_string(),
                Value::function("double", |args| {
                    Ok(Value::from(args.first().map_or(f64::NAN, Value::to_number) * 2.0))
                }),
            );
            data.insert(
                "fail".to_string(),
                Value::function("fail", |_| Err(EvaluationError::native("fail", "boom"))),
            );
            data.insert(
                "apply".to_string(),
                Value::function("apply", |args| match args.first() {
                    Some(Value::Function(f)) => f.call(args),
                    _ => Ok(Value::Undefined),
                }),
            );
            data.insert("items".to_string(), Value::from(json!([1, 2, 3])));
            BindingContext::root(Value::object(data))
        }

        #[test]
        fn should_call_host_functions() {
            let context = context_with_functions();
            assert_eq!(eval_in("double(21)", &context).unwrap(), Value::from(42));
            assert_eq!(eval_in("double.name", &context).unwrap(), Value::from("double"));
            assert_eq!(
                eval_in("fail()", &context).unwrap_err(),
                EvaluationError::native("fail", "boom")
            );
        }

        #[test]
        fn should_bound_runaway_recursion() {
            let context = context_with_functions();
            let overflow = EvaluationError::range("Maximum call stack size exceeded");

            assert_eq!(eval_in("(f => f(f))(f => f(f))", &context).unwrap_err(), overflow);
            assert_eq!(eval_in("apply(f => apply(f))", &context).unwrap_err(), overflow);
            assert_eq!(eval_in("apply(f => 5)", &context).unwrap(), Value::from(5));
            assert_eq!(eval_in("double(double(1))", &context).unwrap(), Value::from(4));
        }

        #[test]
        fn should_reject_calling_non_functions() {
            let error = eval_err("user.name()", json!({"user": {"name": "x"}}));
            assert_eq!(error.to_string(), "TypeError: user.name is not a function");
        }

        #[test]
        fn should_call_arrow_functions_with_captured_scope() {
            let context = context_with_functions();
            assert_eq!(eval_in("(x => double(x) + 1)(4)", &context).unwrap(), Value::from(9));
            assert_eq!(eval_in("((a, b) => b)(1)", &context).unwrap(), Value::Undefined);
        }

        #[test]
        fn should_shadow_scope_names_with_parameters() {
            let context = root_context(json!({"x": "outer", "y": "outer"}));
            assert_eq!(
                eval_in("(x => x + y)('inner')", &context).unwrap(),
                Value::from("innerouter")
            );
        }

        #[test]
        fn should_run_function_bodies() {
            let context = context_with_functions();
            let handler = eval_in("function (v) { double(v); return v + 1; }", &context).unwrap();
            let function = handler.as_function().unwrap();

            assert_eq!(function.call(&[Value::from(1)]).unwrap(), Value::from(2));
            let no_return = eval_in("function () { double(1) }", &context).unwrap();
            assert_eq!(no_return.as_function().unwrap().call(&[]).unwrap(), Value::Undefined);
        }

        #[test]
        fn should_evaluate_host_functions_on_every_call() {
            let counter = Arc::new(AtomicUsize::new(0));
            let seen = Arc::clone(&counter);
            let mut data = IndexMap::new();
            data.insert(
                "next".to_string(),
                Value::function("next", move |_| {
                    Ok(Value::from(seen.fetch_add(1, Ordering::SeqCst) + 1))
                }),
            );
            let context = BindingContext::root(Value::object(data));

            assert_eq!(eval_in("next()", &context).unwrap(), Value::from(1));
            assert_eq!(eval_in("next()", &context).unwrap(), Value::from(2));
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
    }

    mod sandboxing {
        use super::*;

        /// Scope that, unlike a composed scope, only claims the names it holds
        #[derive(Debug)]
        struct StrictScope;

        impl Scope for StrictScope {
            fn lookup(&self, name: &str) -> Value {
                if name == "known" {
                    Value::from(1)
                } else {
                    Value::Undefined
                }
            }

            fn has(&self, name: &str) -> bool {
                name == "known"
            }
        }

        #[test]
        fn should_report_unclaimed_names() {
            let scope: Arc<dyn Scope> = Arc::new(StrictScope);
            let ast = Parser::new().parse_binding("known + unknown").unwrap();

            assert_eq!(
                evaluate(&ast, &scope).unwrap_err(),
                EvaluationError::Reference {
                    name: "unknown".to_string()
                }
            );
        }

        #[test]
        fn should_never_leak_to_ambient_names_through_a_composed_scope() {
            assert_eq!(eval("window", json!({})), Value::Undefined);
            assert_eq!(eval("typeof document", json!({})), Value::from("undefined"));
        }
    }
}
