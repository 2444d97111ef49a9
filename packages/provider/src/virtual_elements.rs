/**
 * Virtual elements
 *
 * Comment nodes can carry bindings too: `<!-- ko text: name -->` opens a
 * virtual element whose annotation is the comment payload, closed again by
 * `<!-- /ko -->`.
 */
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;
use crate::node::{NodeKind, UiNode};

/// Locates the annotation text embedded in non-element nodes
pub trait VirtualBindingLocator: Send + Sync + fmt::Debug {
    /// Annotation text carried by `node`, if any
    fn binding_value(&self, node: &dyn UiNode) -> Option<String>;

    fn has_binding_value(&self, node: &dyn UiNode) -> bool {
        self.binding_value(node).is_some()
    }
}

pub const DEFAULT_PREFIX: &str = "ko";

static DEFAULT_START_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*ko(?:\s+([\s\S]+))?\s*$").unwrap());

static DEFAULT_END_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*/ko\s*$").unwrap());

/// Comment convention: `<prefix> <bindings>` opens, `/<prefix>` closes
#[derive(Debug, Clone)]
pub struct CommentDirectiveLocator {
    start: Regex,
    end: Regex,
}

impl Default for CommentDirectiveLocator {
    fn default() -> Self {
        CommentDirectiveLocator {
            start: DEFAULT_START_PATTERN.clone(),
            end: DEFAULT_END_PATTERN.clone(),
        }
    }
}

impl CommentDirectiveLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locator for comments introduced by `prefix` instead of `ko`
    pub fn with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        if prefix == DEFAULT_PREFIX {
            return Ok(Self::default());
        }
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "virtual_element_prefix",
                reason: format!("'{}' must be a non-empty word", prefix),
            });
        }

        let escaped = regex::escape(prefix);
        Ok(CommentDirectiveLocator {
            start: Regex::new(&format!(r"^\s*{}(?:\s+([\s\S]+))?\s*$", escaped))?,
            end: Regex::new(&format!(r"^\s*/{}\s*$", escaped))?,
        })
    }

    fn comment_text<'a>(node: &'a dyn UiNode) -> Option<&'a str> {
        if node.node_kind() == NodeKind::Comment {
            node.text()
        } else {
            None
        }
    }

    pub fn is_start_comment(&self, node: &dyn UiNode) -> bool {
        Self::comment_text(node).map_or(false, |text| self.start.is_match(text))
    }

    pub fn is_end_comment(&self, node: &dyn UiNode) -> bool {
        Self::comment_text(node).map_or(false, |text| self.end.is_match(text))
    }
}

impl VirtualBindingLocator for CommentDirectiveLocator {
    fn binding_value(&self, node: &dyn UiNode) -> Option<String> {
        let text = Self::comment_text(node)?;
        let captures = self.start.captures(text)?;
        captures.get(1).map(|payload| payload.as_str().to_string())
    }
}
