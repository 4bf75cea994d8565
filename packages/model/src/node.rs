use crate::format::{ElementFormat, TextFormat};
use crate::nodes::decorator::Template;
use crate::nodes::element::{ElementAttrs, Heading, HeadingTag};
use crate::nodes::embed::{Tweet, YouTube};
use crate::nodes::image::Image;
use crate::nodes::layout::LayoutContainer;
use crate::nodes::text::TextNode;

/// Separator appended after a block element's text when it has a next sibling
pub const DOUBLE_LINE_BREAK: &str = "\n\n";

/// Broad class of a node, deciding where it may appear in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    LineBreak,
    InlineDecorator,
    BlockDecorator,
}

/// Payload of one document node.
///
/// The set of node types is closed; every variant has a registry entry that
/// knows how to serialize, export and import it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root(ElementAttrs),
    Paragraph(ElementAttrs),
    Heading(Heading),
    LayoutContainer(LayoutContainer),
    LayoutItem(ElementAttrs),
    Text(TextNode),
    LineBreak,
    Image(Image),
    HorizontalRule,
    PageBreak,
    Template(Template),
    Tweet(Tweet),
    YouTube(YouTube),
}

impl NodeData {
    pub fn paragraph() -> Self {
        NodeData::Paragraph(ElementAttrs::default())
    }

    pub fn heading(tag: HeadingTag) -> Self {
        NodeData::Heading(Heading::new(tag))
    }

    pub fn text(text: impl Into<String>) -> Self {
        NodeData::Text(TextNode::new(text))
    }

    pub fn layout_container(template_columns: impl Into<String>) -> Self {
        NodeData::LayoutContainer(LayoutContainer::new(template_columns))
    }

    pub fn layout_item() -> Self {
        NodeData::LayoutItem(ElementAttrs::default())
    }

    /// Type tag used in JSON and in the registry
    pub fn type_tag(&self) -> &'static str {
        match self {
            NodeData::Root(_) => "root",
            NodeData::Paragraph(_) => "paragraph",
            NodeData::Heading(_) => "heading",
            NodeData::LayoutContainer(_) => "layout-container",
            NodeData::LayoutItem(_) => "layout-item",
            NodeData::Text(_) => "text",
            NodeData::LineBreak => "linebreak",
            NodeData::Image(_) => "image",
            NodeData::HorizontalRule => "horizontalrule",
            NodeData::PageBreak => "page-break",
            NodeData::Template(_) => "template",
            NodeData::Tweet(_) => "tweet",
            NodeData::YouTube(_) => "youtube",
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Root(_)
            | NodeData::Paragraph(_)
            | NodeData::Heading(_)
            | NodeData::LayoutContainer(_)
            | NodeData::LayoutItem(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::LineBreak => NodeKind::LineBreak,
            NodeData::Image(_) => NodeKind::InlineDecorator,
            NodeData::HorizontalRule
            | NodeData::PageBreak
            | NodeData::Template(_)
            | NodeData::Tweet(_)
            | NodeData::YouTube(_) => NodeKind::BlockDecorator,
        }
    }

    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    /// Inline nodes live inside blocks and never at the top level
    pub fn is_inline(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Text | NodeKind::LineBreak | NodeKind::InlineDecorator
        )
    }

    pub fn is_block_decorator(&self) -> bool {
        self.kind() == NodeKind::BlockDecorator
    }

    /// Whether an element may be left without children after a mutation
    pub fn can_be_empty(&self) -> bool {
        !matches!(self, NodeData::LayoutContainer(_))
    }

    /// Shadow roots stop the climb towards the "nearest root" of a selection
    pub fn is_shadow_root(&self) -> bool {
        matches!(
            self,
            NodeData::Root(_) | NodeData::LayoutContainer(_) | NodeData::LayoutItem(_)
        )
    }

    /// Template nodes claim the whole document when they sit at top level
    pub fn is_template(&self) -> bool {
        matches!(self, NodeData::LayoutContainer(_) | NodeData::Template(_))
    }

    /// Text contributed by this node alone, excluding any children
    pub fn own_text(&self) -> String {
        match self {
            NodeData::Text(text) => text.text.clone(),
            NodeData::LineBreak | NodeData::PageBreak | NodeData::HorizontalRule => {
                "\n".to_string()
            }
            NodeData::Tweet(tweet) => tweet.url(),
            NodeData::YouTube(video) => video.url(),
            _ => String::new(),
        }
    }

    pub fn element_attrs(&self) -> Option<&ElementAttrs> {
        match self {
            NodeData::Root(attrs) | NodeData::Paragraph(attrs) | NodeData::LayoutItem(attrs) => {
                Some(attrs)
            }
            NodeData::Heading(heading) => Some(&heading.attrs),
            NodeData::LayoutContainer(container) => Some(&container.attrs),
            _ => None,
        }
    }

    pub fn element_attrs_mut(&mut self) -> Option<&mut ElementAttrs> {
        match self {
            NodeData::Root(attrs) | NodeData::Paragraph(attrs) | NodeData::LayoutItem(attrs) => {
                Some(attrs)
            }
            NodeData::Heading(heading) => Some(&mut heading.attrs),
            NodeData::LayoutContainer(container) => Some(&mut container.attrs),
            _ => None,
        }
    }

    /// Alignment of an element, or of a block embed that carries one
    pub fn element_format(&self) -> Option<ElementFormat> {
        match self {
            NodeData::Tweet(tweet) => Some(tweet.format),
            NodeData::YouTube(video) => Some(video.format),
            _ => self.element_attrs().map(|attrs| attrs.format),
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match self {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_format(&self) -> Option<TextFormat> {
        self.as_text().map(|text| text.format)
    }
}

/// Detached, keyless node tree: the shape of deserialized JSON, imported
/// HTML and template content before it is inserted into a document.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTree {
    pub data: NodeData,
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: NodeTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeTree>) -> Self {
        self.children.extend(children);
        self
    }

    /// A paragraph holding a single plain text node
    pub fn paragraph_with_text(text: impl Into<String>) -> Self {
        NodeTree::new(NodeData::paragraph()).with_child(NodeTree::new(NodeData::text(text)))
    }

    /// Number of nodes in this tree, including the top node
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(NodeTree::size).sum::<usize>()
    }

    pub fn text_content(&self) -> String {
        if !self.data.is_element() {
            return self.data.own_text();
        }
        let mut out = String::new();
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            out.push_str(&child.text_content());
            if child.data.is_element() && !child.data.is_inline() && i != last {
                out.push_str(DOUBLE_LINE_BREAK);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_container_classification() {
        let container = NodeData::layout_container("1fr 1fr");
        assert!(container.is_element());
        assert!(container.is_template());
        assert!(container.is_shadow_root());
        assert!(!container.can_be_empty());
        assert_eq!(container.type_tag(), "layout-container");
    }

    #[test]
    fn test_decorator_classification() {
        assert!(NodeData::PageBreak.is_block_decorator());
        assert!(!NodeData::PageBreak.is_template());
        assert!(NodeData::Image(Image::new("a.png", "")).is_inline());
        assert!(NodeData::paragraph().can_be_empty());
    }

    #[test]
    fn test_text_content_separates_blocks() {
        let root = NodeTree::new(NodeData::Root(ElementAttrs::default()))
            .with_child(NodeTree::paragraph_with_text("Hello"))
            .with_child(NodeTree::paragraph_with_text("world"))
            .with_child(NodeTree::new(NodeData::PageBreak));

        assert_eq!(root.text_content(), "Hello\n\nworld\n\n\n");
        assert_eq!(root.size(), 6);
    }
}
