/**
 * UI Node abstraction
 *
 * The provider only ever reads nodes: their kind, their attributes and, for
 * comments, their text. Hosts plug in their own tree by implementing
 * `UiNode`; the concrete node types here cover tests and the CLI.
 */
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node kind discriminator, numbered like DOM `nodeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

/// A node of the host's UI tree
pub trait UiNode: Send + Sync + fmt::Debug {
    fn node_kind(&self) -> NodeKind;

    /// Attribute value, for element nodes
    fn attribute(&self, _name: &str) -> Option<&str> {
        None
    }

    /// Character data, for comment and text nodes
    fn text(&self) -> Option<&str> {
        None
    }

    /// Short rendering used in diagnostics
    fn describe(&self) -> String;
}

pub type NodeRef = Arc<dyn UiNode>;

/// Whether two references point at the same node
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub tag_name: String,
    pub attributes: IndexMap<String, String>,
}

impl ElementNode {
    pub fn new(tag_name: impl Into<String>) -> Self {
        ElementNode {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

impl UiNode for ElementNode {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Element
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn describe(&self) -> String {
        let mut out = format!("<{}", self.tag_name);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, value.replace('"', "&quot;")));
        }
        out.push('>');
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    pub data: String,
}

impl CommentNode {
    pub fn new(data: impl Into<String>) -> Self {
        CommentNode { data: data.into() }
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

impl UiNode for CommentNode {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Comment
    }

    fn text(&self) -> Option<&str> {
        Some(&self.data)
    }

    fn describe(&self) -> String {
        format!("<!--{}-->", self.data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub data: String,
}

impl TextNode {
    pub fn new(data: impl Into<String>) -> Self {
        TextNode { data: data.into() }
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }
}

impl UiNode for TextNode {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Text
    }

    fn text(&self) -> Option<&str> {
        Some(&self.data)
    }

    fn describe(&self) -> String {
        format!("#text \"{}\"", self.data)
    }
}
