//! External (DOM-like) representation of document content.
//!
//! Node types export into this shape for HTML generation and recognize it
//! again when content authored outside the editor is pasted back in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element or text in the external representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExternalNode {
    Element(ExternalElement),
    Text { content: String },
}

/// DOM-like element: tag, attributes, inline style declarations, children
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalElement {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Inline style declarations in insertion order
    pub styles: Vec<(String, String)>,
    pub children: Vec<ExternalNode>,
}

impl ExternalNode {
    pub fn element(tag: impl Into<String>) -> Self {
        ExternalNode::Element(ExternalElement::new(tag))
    }

    pub fn text(content: impl Into<String>) -> Self {
        ExternalNode::Text {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&ExternalElement> {
        match self {
            ExternalNode::Element(element) => Some(element),
            ExternalNode::Text { .. } => None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let ExternalNode::Element(ref mut element) = self {
            element.attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let ExternalNode::Element(ref mut element) = self {
            element.set_style(key, value);
        }
        self
    }

    pub fn with_child(mut self, child: ExternalNode) -> Self {
        if let ExternalNode::Element(ref mut element) = self {
            element.children.push(child);
        }
        self
    }

    /// Wrap this node in a new parent element
    pub fn wrapped_in(self, tag: impl Into<String>) -> Self {
        ExternalNode::element(tag).with_child(self)
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            ExternalNode::Text { content } => out.push_str(content),
            ExternalNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Remove `style` and `class` from this node and every descendant
    pub fn strip_presentational(&mut self) {
        if let ExternalNode::Element(element) = self {
            element.strip_presentational();
        }
    }
}

impl ExternalElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.styles.iter_mut().find(|(name, _)| *name == property) {
            Some(existing) => existing.1 = value,
            None => self.styles.push((property, value)),
        }
    }

    /// Inline style declarations rendered as a CSS declaration list
    pub fn style_attribute(&self) -> Option<String> {
        if self.styles.is_empty() {
            return None;
        }
        let declarations: Vec<String> = self
            .styles
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect();
        Some(declarations.join(" "))
    }

    pub fn strip_presentational(&mut self) {
        self.attributes.remove("class");
        self.attributes.remove("style");
        self.styles.clear();
        for child in &mut self.children {
            child.strip_presentational();
        }
    }
}
