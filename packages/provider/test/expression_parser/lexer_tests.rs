/**
 * Lexer Tests
 *
 * Tokenizing annotation text
 */

#[cfg(test)]
mod tests {
    use binding_provider::expression_parser::lexer::{Lexer, StringTokenKind, Token, TokenType};

    fn lex(text: &str) -> Vec<Token> {
        Lexer::new().tokenize(text)
    }

    fn expect_token(token: &Token, index: usize, end: usize) {
        assert_eq!(token.index, index, "Token index mismatch");
        assert_eq!(token.end, end, "Token end mismatch");
    }

    fn expect_character_token(token: &Token, index: usize, end: usize, character: char) {
        expect_token(token, index, end);
        assert!(
            token.is_character(character),
            "Expected character token '{}'",
            character
        );
    }

    fn expect_operator_token(token: &Token, index: usize, end: usize, operator: &str) {
        expect_token(token, index, end);
        assert!(
            token.is_operator(operator),
            "Expected operator token '{}', got {:?}",
            operator,
            token
        );
    }

    fn expect_identifier_token(token: &Token, index: usize, end: usize, identifier: &str) {
        expect_token(token, index, end);
        assert!(token.is_identifier(), "Expected identifier token");
        assert_eq!(token.str_value, identifier);
    }

    fn expect_number_token(token: &Token, index: usize, end: usize, n: f64) {
        expect_token(token, index, end);
        assert!(token.is_number(), "Expected number token");
        assert_eq!(token.num_value, n);
    }

    fn expect_string_token(token: &Token, index: usize, end: usize, value: &str) {
        expect_token(token, index, end);
        assert!(token.is_string(), "Expected string token");
        assert_eq!(token.str_value, value);
    }

    mod bindings {
        use super::*;

        #[test]
        fn should_tokenize_a_binding_pair() {
            let tokens = lex("text: name");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 4, "text");
            expect_character_token(&tokens[1], 4, 5, ':');
            expect_identifier_token(&tokens[2], 6, 10, "name");
        }

        #[test]
        fn should_tokenize_dollar_prefixed_names() {
            let tokens = lex("$parent.$data");
            assert_eq!(tokens.len(), 3);
            expect_identifier_token(&tokens[0], 0, 7, "$parent");
            expect_character_token(&tokens[1], 7, 8, '.');
            expect_identifier_token(&tokens[2], 8, 13, "$data");
        }

        #[test]
        fn should_tokenize_keywords() {
            let tokens = lex("null undefined true false typeof void in function return");
            assert!(tokens.iter().all(|t| t.token_type == TokenType::Keyword));
            assert_eq!(tokens.len(), 9);
        }

        #[test]
        fn should_report_no_tokens_for_blank_text() {
            assert!(lex("").is_empty());
            assert!(lex("  \n\t ").is_empty());
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn should_tokenize_integers_and_floats() {
            let tokens = lex("12 0.5 .25 1e3 2E-2");
            expect_number_token(&tokens[0], 0, 2, 12.0);
            expect_number_token(&tokens[1], 3, 6, 0.5);
            expect_number_token(&tokens[2], 7, 10, 0.25);
            expect_number_token(&tokens[3], 11, 14, 1000.0);
            expect_number_token(&tokens[4], 15, 19, 0.02);
        }

        #[test]
        fn should_report_invalid_exponent() {
            let tokens = lex("1e");
            assert_eq!(tokens.len(), 1);
            assert!(tokens[0].is_error());
            assert!(tokens[0].str_value.contains("Invalid exponent"));
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn should_tokenize_quoted_strings() {
            let tokens = lex(r#"'a' "b""#);
            expect_string_token(&tokens[0], 0, 3, "a");
            expect_string_token(&tokens[1], 4, 7, "b");
        }

        #[test]
        fn should_decode_escapes() {
            let tokens = lex(r#"'it\'s\nA'"#);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].str_value, "it's\nA");
        }

        #[test]
        fn should_report_unterminated_string() {
            let tokens = lex("'abc");
            assert!(tokens.last().unwrap().is_error());
        }

        #[test]
        fn should_tokenize_template_literals() {
            let tokens = lex("`a${b}c`");
            assert!(tokens[0].is_template_literal_part());
            assert_eq!(tokens[0].str_value, "a");
            assert!(tokens[1].is_template_literal_interpolation_start());
            expect_identifier_token(&tokens[2], 4, 5, "b");
            expect_character_token(&tokens[3], 5, 6, '}');
            assert!(tokens[4].is_template_literal_end());
            assert_eq!(tokens[4].kind, Some(StringTokenKind::TemplateLiteralEnd));
            assert_eq!(tokens[4].str_value, "c");
        }

        #[test]
        fn should_keep_object_braces_inside_interpolation() {
            let tokens = lex("`${ {a: 1}.a }`");
            assert!(tokens.iter().all(|t| !t.is_error()));
            assert!(tokens.last().unwrap().is_template_literal_end());
        }
    }

    mod operators {
        use super::*;

        #[test]
        fn should_tokenize_comparison_operators() {
            let tokens = lex("a === b !== c <= d >= e");
            expect_operator_token(&tokens[1], 2, 5, "===");
            expect_operator_token(&tokens[3], 8, 11, "!==");
            expect_operator_token(&tokens[5], 14, 16, "<=");
            expect_operator_token(&tokens[7], 19, 21, ">=");
        }

        #[test]
        fn should_tokenize_logical_operators() {
            let tokens = lex("a && b || c ?? d");
            expect_operator_token(&tokens[1], 2, 4, "&&");
            expect_operator_token(&tokens[3], 7, 9, "||");
            expect_operator_token(&tokens[5], 12, 14, "??");
        }

        #[test]
        fn should_tokenize_safe_navigation_but_not_before_digits() {
            let tokens = lex("a?.b");
            expect_operator_token(&tokens[1], 1, 3, "?.");

            let tokens = lex("a?.5:1");
            expect_operator_token(&tokens[1], 1, 2, "?");
            expect_number_token(&tokens[2], 2, 4, 0.5);
        }

        #[test]
        fn should_tokenize_arrow_and_exponent() {
            let tokens = lex("x => x ** 2");
            expect_operator_token(&tokens[1], 2, 4, "=>");
            expect_operator_token(&tokens[3], 7, 9, "**");
        }

        #[test]
        fn should_report_invalid_characters() {
            let tokens = lex("a # b");
            assert_eq!(tokens.len(), 2);
            assert!(tokens[1].is_error());
            assert!(tokens[1].str_value.contains("Invalid character [#]"));
        }
    }
}
