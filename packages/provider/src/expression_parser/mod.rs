/**
 * Expression Parser Module
 *
 * Tokenize → split top-level pairs → parse each expression into an AST.
 */
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
pub use serializer::{serialize, serialize_bindings};

use crate::error::ParseResult;

/// Rewrite annotation text into its canonical object-literal form
pub fn rewrite_bindings(text: &str) -> ParseResult<String> {
    let bindings = Parser::new().parse_bindings(text)?;
    Ok(serialize_bindings(&bindings))
}
