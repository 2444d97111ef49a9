#![deny(clippy::all)]

/**
 * Declarative Binding Provider
 *
 * Scans UI nodes for `name: expression` binding annotations, compiles them
 * with a hand-written expression parser and evaluates them against a layered
 * binding context.
 */

// Expression language
pub mod chars;
pub mod expression_parser;
pub mod interpreter;
pub mod value;

// Nodes and annotations
pub mod extractor;
pub mod node;
pub mod virtual_elements;

// Contexts and scopes
pub mod context;
pub mod scope;

// Compilation and resolution
pub mod bindings;
pub mod cache;
pub mod compiler;
pub mod provider;

pub mod config;
pub mod error;

// Re-exports
pub use bindings::{Accessor, BindingAccessors, BindingValue};
pub use cache::{CacheStats, EvaluatorCache};
pub use compiler::{BindingForm, CompiledBinding, Evaluator, ExpressionCompiler};
pub use config::ProviderConfig;
pub use context::BindingContext;
pub use error::{
    BindingResolutionError, CompilationError, ConfigError, EvaluationError, ParseError,
    ResolutionCause,
};
pub use expression_parser::rewrite_bindings;
pub use extractor::AnnotationExtractor;
pub use node::{CommentNode, ElementNode, NodeKind, NodeRef, TextNode, UiNode};
pub use provider::BindingProvider;
pub use scope::{compose, ComposedScope, Scope};
pub use value::{Function, Value};
pub use virtual_elements::{CommentDirectiveLocator, VirtualBindingLocator};
