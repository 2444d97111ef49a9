/**
 * Error types
 *
 * Compilation failures carry the raw annotation text, runtime failures the
 * offending expression's description, and everything surfaced to the host is
 * wrapped in `BindingResolutionError` together with the node being bound.
 */
use thiserror::Error;

use crate::expression_parser::ast::ParseSpan;
use crate::node::NodeRef;

pub type ParseResult<T> = Result<T, ParseError>;

pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Syntax problem found while tokenizing or parsing annotation text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parser Error: {message} at column {} in [{input}]", self.column())]
pub struct ParseError {
    pub message: String,
    pub span: ParseSpan,
    pub input: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: ParseSpan, input: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            span,
            input: input.into(),
        }
    }

    /// Character (not byte) column where the problem starts
    pub fn column(&self) -> usize {
        char_column(&self.input, self.span.start)
    }
}

/// Number of characters before byte offset `index` of `input`
pub(crate) fn char_column(input: &str, index: usize) -> usize {
    input.char_indices().take_while(|(i, _)| *i < index).count()
}

/// Annotation text that could not be compiled into an evaluator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to parse bindings.\nBindings value: {bindings_text}\nMessage: {source}")]
pub struct CompilationError {
    pub bindings_text: String,
    #[source]
    pub source: ParseError,
}

/// Failure while evaluating an expression against a composed scope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Member access on `undefined`/`null` and similar misuse
    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("TypeError: {callee} is not a function")]
    NotCallable { callee: String },

    /// A name the scope does not claim to have
    #[error("ReferenceError: {name} is not defined")]
    Reference { name: String },

    /// Runaway recursion, e.g. a self-applying function
    #[error("RangeError: {message}")]
    Range { message: String },

    /// Reported by a host-supplied native function
    #[error("{name}: {message}")]
    Native { name: String, message: String },
}

impl EvaluationError {
    pub fn type_error(message: impl Into<String>) -> Self {
        EvaluationError::TypeError {
            message: message.into(),
        }
    }

    pub fn range(message: impl Into<String>) -> Self {
        EvaluationError::Range {
            message: message.into(),
        }
    }

    pub fn native(name: impl Into<String>, message: impl Into<String>) -> Self {
        EvaluationError::Native {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// What went wrong while resolving one node's bindings
#[derive(Debug, Clone, Error)]
pub enum ResolutionCause {
    #[error(transparent)]
    Compilation(CompilationError),

    #[error("{source}")]
    Evaluation {
        binding: Option<String>,
        source: EvaluationError,
    },
}

impl ResolutionCause {
    /// The underlying problem without the outer "Unable to parse" framing
    pub fn message(&self) -> String {
        match self {
            ResolutionCause::Compilation(error) => error.source.to_string(),
            ResolutionCause::Evaluation {
                binding: Some(binding),
                source,
            } => format!("{} (binding '{}')", source, binding),
            ResolutionCause::Evaluation {
                binding: None,
                source,
            } => source.to_string(),
        }
    }
}

/// Error surfaced to the host: which node failed, with which text, and why
#[derive(Debug, Clone, Error)]
#[error("Unable to parse bindings.\nBindings value: {bindings_text}\nMessage: {}", .cause.message())]
pub struct BindingResolutionError {
    pub node: NodeRef,
    pub bindings_text: String,
    #[source]
    pub cause: ResolutionCause,
}

impl BindingResolutionError {
    pub fn compilation(node: NodeRef, error: CompilationError) -> Self {
        BindingResolutionError {
            node,
            bindings_text: error.bindings_text.clone(),
            cause: ResolutionCause::Compilation(error),
        }
    }

    pub fn evaluation(
        node: NodeRef,
        bindings_text: impl Into<String>,
        binding: Option<String>,
        source: EvaluationError,
    ) -> Self {
        BindingResolutionError {
            node,
            bindings_text: bindings_text.into(),
            cause: ResolutionCause::Evaluation { binding, source },
        }
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    pub fn bindings_text(&self) -> &str {
        &self.bindings_text
    }

    pub fn is_compilation_error(&self) -> bool {
        matches!(self.cause, ResolutionCause::Compilation(_))
    }

    /// Name of the binding whose evaluation failed, when known
    pub fn binding(&self) -> Option<&str> {
        match &self.cause {
            ResolutionCause::Evaluation { binding, .. } => binding.as_deref(),
            ResolutionCause::Compilation(_) => None,
        }
    }
}

/// Invalid provider configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid virtual element pattern: {0}")]
    Pattern(#[from] regex::Error),
}
