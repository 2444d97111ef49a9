/**
 * Annotation Extractor
 *
 * Finds the raw annotation text of a node: the binding attribute on
 * elements, the locator's payload on comments, nothing on anything else.
 * Blank text counts as no annotation.
 */
use std::sync::Arc;

use crate::node::{NodeKind, UiNode};
use crate::virtual_elements::{CommentDirectiveLocator, VirtualBindingLocator};

pub const DEFAULT_BINDING_ATTRIBUTE: &str = "data-bind";

#[derive(Debug, Clone)]
pub struct AnnotationExtractor {
    attribute_name: String,
    locator: Arc<dyn VirtualBindingLocator>,
}

impl Default for AnnotationExtractor {
    fn default() -> Self {
        Self::new(
            DEFAULT_BINDING_ATTRIBUTE,
            Arc::new(CommentDirectiveLocator::default()),
        )
    }
}

impl AnnotationExtractor {
    pub fn new(attribute_name: impl Into<String>, locator: Arc<dyn VirtualBindingLocator>) -> Self {
        AnnotationExtractor {
            attribute_name: attribute_name.into(),
            locator,
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn locator(&self) -> &Arc<dyn VirtualBindingLocator> {
        &self.locator
    }

    pub fn has_annotation(&self, node: &dyn UiNode) -> bool {
        match node.node_kind() {
            NodeKind::Element => self.extract_text(node).is_some(),
            NodeKind::Comment => {
                self.locator.has_binding_value(node) && self.extract_text(node).is_some()
            }
            _ => false,
        }
    }

    pub fn extract_text(&self, node: &dyn UiNode) -> Option<String> {
        let text = match node.node_kind() {
            NodeKind::Element => node.attribute(&self.attribute_name).map(str::to_string),
            NodeKind::Comment => self.locator.binding_value(node),
            _ => None,
        }?;

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
