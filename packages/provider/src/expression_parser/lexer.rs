/**
 * Binding Expression Lexer
 *
 * Tokenizes declarative binding annotations (`name: expression, ...`) into
 * tokens for the binding-list parser.
 */
use serde::{Deserialize, Serialize};

use crate::chars;
use crate::error::char_column;

/// Token types in binding expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    Character = 0,
    Identifier = 1,
    Keyword = 2,
    String = 3,
    Operator = 4,
    Number = 5,
    Error = 6,
}

/// String token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringTokenKind {
    Plain,
    TemplateLiteralPart,
    TemplateLiteralEnd,
}

/// Token representation. `index` and `end` are byte offsets into the
/// annotation text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
    pub kind: Option<StringTokenKind>,
}

impl Token {
    pub fn new(
        index: usize,
        end: usize,
        token_type: TokenType,
        num_value: f64,
        str_value: String,
    ) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value,
            str_value,
            kind: None,
        }
    }

    pub fn operator(index: usize, end: usize, str_value: &str) -> Self {
        Token::new(index, end, TokenType::Operator, 0.0, str_value.to_string())
    }

    pub fn error(index: usize, end: usize, message: String) -> Self {
        Token::new(index, end, TokenType::Error, 0.0, message)
    }

    pub fn with_kind(mut self, kind: StringTokenKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn is_character(&self, code: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.chars().next() == Some(code)
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String && self.kind == Some(StringTokenKind::Plain)
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.token_type == TokenType::Keyword && self.str_value == keyword
    }

    pub fn is_operator(&self, operator: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == operator
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }

    pub fn is_template_literal_part(&self) -> bool {
        self.token_type == TokenType::String
            && self.kind == Some(StringTokenKind::TemplateLiteralPart)
    }

    pub fn is_template_literal_end(&self) -> bool {
        self.token_type == TokenType::String
            && self.kind == Some(StringTokenKind::TemplateLiteralEnd)
    }

    pub fn is_template_literal_interpolation_start(&self) -> bool {
        self.is_operator("${")
    }

    /// Human readable rendering used in parser diagnostics
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Number => format!("number {}", self.str_value),
            TokenType::String => format!("string \"{}\"", self.str_value),
            TokenType::Keyword => format!("keyword '{}'", self.str_value),
            TokenType::Identifier => format!("identifier '{}'", self.str_value),
            TokenType::Character | TokenType::Operator => format!("'{}'", self.str_value),
            TokenType::Error => self.str_value.clone(),
        }
    }
}

/// Binding expression lexer
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        Scanner::new(text).scan()
    }
}

const KEYWORDS: &[&str] = &[
    "null",
    "undefined",
    "true",
    "false",
    "typeof",
    "void",
    "in",
    "function",
    "return",
    "this",
    "new",
];

/// Scanner for tokenizing input
struct Scanner<'a> {
    input: &'a str,
    length: usize,
    index: usize,
    peek: char,
    tokens: Vec<Token>,
    // Brace depths at which a `${` interpolation closes back into its template
    interpolation_brace_stack: Vec<i32>,
    brace_depth: i32,
    resume_template: bool,
}

impl<'a> Scanner<'a> {
    /// Character column of byte offset `index`, for diagnostics
    fn column(&self, index: usize) -> usize {
        char_column(self.input, index)
    }

    fn new(input: &'a str) -> Self {
        let peek = input.chars().next().unwrap_or(chars::EOF);
        Scanner {
            input,
            length: input.len(),
            index: 0,
            peek,
            tokens: Vec::new(),
            interpolation_brace_stack: Vec::new(),
            brace_depth: 0,
            resume_template: false,
        }
    }

    fn scan(mut self) -> Vec<Token> {
        while let Some(token) = self.scan_token() {
            let is_error = token.is_error();
            self.tokens.push(token);
            if is_error {
                // The parser reports the first lexer error; anything after it is noise.
                break;
            }
        }
        self.tokens
    }

    fn advance(&mut self) {
        self.index += self.peek.len_utf8();
        self.peek = self.char_at(self.index).unwrap_or(chars::EOF);
    }

    fn char_at(&self, index: usize) -> Option<char> {
        if index < self.length {
            self.input[index..].chars().next()
        } else {
            None
        }
    }

    fn next_char(&self) -> Option<char> {
        self.char_at(self.index + self.peek.len_utf8())
    }

    fn scan_token(&mut self) -> Option<Token> {
        if self.resume_template {
            self.resume_template = false;
            return Some(self.scan_template_literal_part(self.index));
        }

        while self.index < self.length && chars::is_whitespace(self.peek) {
            self.advance();
        }

        if self.index >= self.length {
            return None;
        }

        let start = self.index;
        let ch = self.peek;

        if ch == chars::DOLLAR && self.next_char() == Some(chars::LBRACE) {
            self.advance();
            self.advance();
            self.interpolation_brace_stack.push(self.brace_depth);
            self.brace_depth += 1;
            return Some(Token::operator(start, self.index, "${"));
        }

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }

        if chars::is_digit(ch) {
            return Some(self.scan_number(start));
        }

        let token = match ch {
            chars::PERIOD => {
                self.advance();
                if chars::is_digit(self.peek) {
                    return Some(self.scan_number(start));
                }
                Token::new(
                    start,
                    self.index,
                    TokenType::Character,
                    0.0,
                    chars::PERIOD.to_string(),
                )
            }
            chars::LPAREN
            | chars::RPAREN
            | chars::LBRACKET
            | chars::RBRACKET
            | chars::COMMA
            | chars::COLON
            | chars::SEMICOLON => self.scan_character(start, ch),
            chars::LBRACE => {
                self.brace_depth += 1;
                self.scan_character(start, ch)
            }
            chars::RBRACE => {
                self.brace_depth -= 1;
                let token = self.scan_character(start, ch);
                if let Some(&target_depth) = self.interpolation_brace_stack.last() {
                    if self.brace_depth == target_depth {
                        self.interpolation_brace_stack.pop();
                        self.resume_template = true;
                    }
                }
                token
            }
            chars::SQ | chars::DQ => self.scan_string(ch),
            chars::BT => {
                self.advance();
                self.scan_template_literal_part(start)
            }
            chars::PLUS | chars::MINUS | chars::PERCENT | chars::SLASH => {
                self.advance();
                Token::operator(start, self.index, &ch.to_string())
            }
            chars::STAR => {
                self.advance();
                if self.peek == chars::STAR {
                    self.advance();
                    return Some(Token::operator(start, self.index, "**"));
                }
                Token::operator(start, self.index, "*")
            }
            chars::AMPERSAND => self.scan_doubled_operator(start, ch),
            chars::BAR => self.scan_doubled_operator(start, ch),
            chars::LT | chars::GT => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    return Some(Token::operator(start, self.index, &format!("{}=", ch)));
                }
                Token::operator(start, self.index, &ch.to_string())
            }
            chars::QUESTION => {
                self.advance();
                if self.peek == chars::PERIOD
                    && !self.next_char().map_or(false, chars::is_digit)
                {
                    self.advance();
                    return Some(Token::operator(start, self.index, "?."));
                }
                if self.peek == chars::QUESTION {
                    self.advance();
                    return Some(Token::operator(start, self.index, "??"));
                }
                Token::operator(start, self.index, "?")
            }
            chars::BANG => {
                self.advance();
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                        return Some(Token::operator(start, self.index, "!=="));
                    }
                    return Some(Token::operator(start, self.index, "!="));
                }
                Token::operator(start, self.index, "!")
            }
            chars::EQ => {
                self.advance();
                if self.peek == chars::GT {
                    self.advance();
                    return Some(Token::operator(start, self.index, "=>"));
                }
                if self.peek == chars::EQ {
                    self.advance();
                    if self.peek == chars::EQ {
                        self.advance();
                        return Some(Token::operator(start, self.index, "==="));
                    }
                    return Some(Token::operator(start, self.index, "=="));
                }
                Token::operator(start, self.index, "=")
            }
            _ => {
                self.advance();
                Token::error(
                    start,
                    self.index,
                    format!(
                        "Lexer Error: Invalid character [{}] at column {} in expression [{}]",
                        ch, self.column(start), self.input
                    ),
                )
            }
        };
        Some(token)
    }

    fn scan_character(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        Token::new(start, self.index, TokenType::Character, 0.0, ch.to_string())
    }

    /// `&&`/`||`, or the single bitwise form which the parser rejects
    fn scan_doubled_operator(&mut self, start: usize, ch: char) -> Token {
        self.advance();
        if self.peek == ch {
            self.advance();
            return Token::operator(start, self.index, &format!("{}{}", ch, ch));
        }
        Token::operator(start, self.index, &ch.to_string())
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.index;
        self.advance();

        while self.index < self.length && chars::is_identifier_part(self.peek) {
            self.advance();
        }

        let str_value = self.input[start..self.index].to_string();
        let token_type = if KEYWORDS.contains(&str_value.as_str()) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };

        Token::new(start, self.index, token_type, 0.0, str_value)
    }

    fn scan_number(&mut self, start: usize) -> Token {
        let mut seen_exponent = false;
        while self.index < self.length {
            if chars::is_digit(self.peek) || (self.peek == chars::PERIOD && !seen_exponent) {
                self.advance();
            } else if (self.peek == 'e' || self.peek == 'E') && !seen_exponent {
                seen_exponent = true;
                self.advance();
                if self.peek == chars::PLUS || self.peek == chars::MINUS {
                    self.advance();
                }
                if !chars::is_digit(self.peek) {
                    return Token::error(
                        start,
                        self.index,
                        format!(
                            "Lexer Error: Invalid exponent at column {} in expression [{}]",
                            self.column(self.index), self.input
                        ),
                    );
                }
            } else {
                break;
            }
        }

        let str_value = self.input[start..self.index].to_string();
        match str_value.parse::<f64>() {
            Ok(num_value) => Token::new(start, self.index, TokenType::Number, num_value, str_value),
            Err(_) => Token::error(
                start,
                self.index,
                format!(
                    "Lexer Error: Invalid number [{}] at column {} in expression [{}]",
                    str_value, self.column(start), self.input
                ),
            ),
        }
    }

    /// Consumes the character after a backslash and returns its decoded value
    fn scan_escape(&mut self) -> Result<char, Token> {
        let escape_start = self.index - 1;
        let ch = self.peek;
        if ch == 'u' {
            self.advance();
            let mut hex = String::new();
            for _ in 0..4 {
                if self.index >= self.length {
                    break;
                }
                hex.push(self.peek);
                self.advance();
            }
            return u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| hex.len() == 4)
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    Token::error(
                        escape_start,
                        self.index,
                        format!(
                            "Lexer Error: Invalid unicode escape [\\u{}] at column {} in expression [{}]",
                            hex, self.column(escape_start), self.input
                        ),
                    )
                });
        }
        self.advance();
        Ok(match ch {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'b' => '\x08',
            'f' => '\x0c',
            'v' => '\x0b',
            '0' => '\0',
            _ => ch,
        })
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.index;
        self.advance();

        let mut buffer = String::new();
        while self.index < self.length {
            let ch = self.peek;
            if ch == chars::BACKSLASH {
                self.advance();
                match self.scan_escape() {
                    Ok(decoded) => buffer.push(decoded),
                    Err(error) => return error,
                }
            } else if ch == quote {
                self.advance();
                return Token::new(start, self.index, TokenType::String, 0.0, buffer)
                    .with_kind(StringTokenKind::Plain);
            } else {
                buffer.push(ch);
                self.advance();
            }
        }

        Token::error(
            start,
            self.index,
            format!(
                "Lexer Error: Unterminated quote at column {} in expression [{}]",
                self.column(start), self.input
            ),
        )
    }

    fn scan_template_literal_part(&mut self, start: usize) -> Token {
        let mut buffer = String::new();

        while self.index < self.length {
            let ch = self.peek;

            if ch == chars::BACKSLASH {
                self.advance();
                if self.index >= self.length {
                    break;
                }
                match self.scan_escape() {
                    Ok(decoded) => buffer.push(decoded),
                    Err(error) => return error,
                }
            } else if ch == chars::BT {
                self.advance();
                return Token::new(start, self.index, TokenType::String, 0.0, buffer)
                    .with_kind(StringTokenKind::TemplateLiteralEnd);
            } else if ch == chars::DOLLAR && self.next_char() == Some(chars::LBRACE) {
                return Token::new(start, self.index, TokenType::String, 0.0, buffer)
                    .with_kind(StringTokenKind::TemplateLiteralPart);
            } else {
                buffer.push(ch);
                self.advance();
            }
        }

        Token::error(
            self.index,
            self.index,
            format!(
                "Lexer Error: Unterminated template literal at column {} in expression [{}]",
                self.column(self.index), self.input
            ),
        )
    }
}
