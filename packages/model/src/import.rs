//! Conversion of external (pasted) content into detached node trees.

use crate::external::{ExternalElement, ExternalNode};
use crate::format::TextFormat;
use crate::node::{NodeData, NodeTree};
use crate::nodes::text::TextNode;

/// Formatting pushed from a wrapping element (`<b>`, styled `<span>`, ...)
/// down to every text node beneath it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub format: TextFormat,
    /// CSS declarations appended to the text node's style
    pub style: String,
}

impl TextPatch {
    pub fn format(format: TextFormat) -> Self {
        Self {
            format,
            style: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.format.is_empty() && self.style.is_empty()
    }

    /// Combine with a patch from an inner element
    pub fn merged(&self, inner: &TextPatch) -> TextPatch {
        TextPatch {
            format: self.format | inner.format,
            style: format!("{}{}", self.style, inner.style),
        }
    }

    pub fn apply(&self, text: &mut TextNode) {
        text.format |= self.format;
        text.style.push_str(&self.style);
    }
}

/// Result of a recognizer accepting an external element
#[derive(Debug, Clone, PartialEq)]
pub struct DomConversion {
    /// Node created for the element. `None` means the element only carries
    /// formatting and its children are lifted into the parent.
    pub node: Option<NodeData>,
    pub patch: TextPatch,
    /// Higher priority wins when several recognizers accept one element
    pub priority: u8,
}

impl DomConversion {
    pub fn node(node: NodeData, priority: u8) -> Self {
        Self {
            node: Some(node),
            patch: TextPatch::default(),
            priority,
        }
    }

    pub fn patch(patch: TextPatch, priority: u8) -> Self {
        Self {
            node: None,
            patch,
            priority,
        }
    }
}

/// A recognizer inspects one element and converts it when it matches
pub type Recognizer = fn(&ExternalElement) -> Option<DomConversion>;

/// Source of recognizers for a lowercase tag name
pub trait RecognizerLookup {
    fn recognizers(&self, tag: &str) -> Vec<Recognizer>;
}

/// Convert an external fragment into top-level node trees.
///
/// Loose inline content at the top level is wrapped in paragraphs so the
/// result can be appended to a root directly.
pub fn import_external(lookup: &dyn RecognizerLookup, nodes: &[ExternalNode]) -> Vec<NodeTree> {
    let patch = TextPatch::default();
    let mut converted = Vec::new();
    for node in nodes {
        converted.extend(convert_node(lookup, node, &patch));
    }
    wrap_inline_runs(converted)
}

fn convert_node(
    lookup: &dyn RecognizerLookup,
    node: &ExternalNode,
    patch: &TextPatch,
) -> Vec<NodeTree> {
    match node {
        ExternalNode::Text { content } => convert_text(content, patch).into_iter().collect(),
        ExternalNode::Element(element) => convert_element(lookup, element, patch),
    }
}

fn convert_text(content: &str, patch: &TextPatch) -> Option<NodeTree> {
    let collapsed = collapse_whitespace(content);
    if collapsed.trim().is_empty() {
        return None;
    }
    let mut text = TextNode::new(collapsed);
    patch.apply(&mut text);
    Some(NodeTree::new(NodeData::Text(text)))
}

fn collapse_whitespace(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_space = false;
    for c in content.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn best_conversion(lookup: &dyn RecognizerLookup, element: &ExternalElement) -> Option<DomConversion> {
    let tag = element.tag.to_ascii_lowercase();
    let mut best: Option<DomConversion> = None;
    for recognize in lookup.recognizers(&tag) {
        if let Some(conversion) = recognize(element) {
            if best
                .as_ref()
                .map_or(true, |current| conversion.priority > current.priority)
            {
                best = Some(conversion);
            }
        }
    }
    best
}

fn convert_element(
    lookup: &dyn RecognizerLookup,
    element: &ExternalElement,
    patch: &TextPatch,
) -> Vec<NodeTree> {
    let conversion = best_conversion(lookup, element);
    let child_patch = match &conversion {
        Some(conversion) => patch.merged(&conversion.patch),
        None => patch.clone(),
    };

    let mut children = Vec::new();
    for child in &element.children {
        children.extend(convert_node(lookup, child, &child_patch));
    }

    match conversion.and_then(|c| c.node) {
        Some(data) if data.is_element() => {
            let children = if data.is_shadow_root() {
                wrap_inline_runs(children)
            } else {
                children
            };
            vec![NodeTree::new(data).with_children(children)]
        }
        // Leaves and decorators own their content; nested markup is dropped
        Some(data) => vec![NodeTree::new(data)],
        None => children,
    }
}

/// Wrap consecutive inline nodes in paragraphs
fn wrap_inline_runs(nodes: Vec<NodeTree>) -> Vec<NodeTree> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run: Vec<NodeTree> = Vec::new();
    for node in nodes {
        if node.data.is_inline() {
            run.push(node);
            continue;
        }
        if !run.is_empty() {
            out.push(NodeTree::new(NodeData::paragraph()).with_children(run.drain(..)));
        }
        out.push(node);
    }
    if !run.is_empty() {
        out.push(NodeTree::new(NodeData::paragraph()).with_children(run));
    }
    out
}
