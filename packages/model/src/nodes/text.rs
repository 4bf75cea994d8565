//! Text runs and line breaks.

use super::{bare_fields, from_fields, mismatch, to_fields};
use crate::error::ModelResult;
use crate::external::{ExternalElement, ExternalNode};
use crate::format::TextFormat;
use crate::import::{DomConversion, TextPatch};
use crate::node::NodeData;
use crate::style::{extra_styles, parse_style_attribute};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    #[default]
    Normal,
    Token,
    Segmented,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextNode {
    pub detail: u32,
    pub format: TextFormat,
    pub mode: TextMode,
    /// Inline CSS declarations, e.g. `font-size: 20px;`
    pub style: String,
    pub text: String,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: TextFormat) -> Self {
        self.format = format;
        self
    }

    pub fn has_format(&self, format: TextFormat) -> bool {
        self.format.contains(format)
    }
}

pub const TYPE: &str = "text";

pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
    match data {
        NodeData::Text(text) => to_fields(TYPE, VERSION, text),
        other => Err(mismatch(TYPE, other)),
    }
}

pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
    Ok(NodeData::Text(from_fields(TYPE, value)?))
}

/// Tag of the element holding the characters
fn inner_tag(format: TextFormat) -> &'static str {
    if format.contains(TextFormat::BOLD) {
        "strong"
    } else if format.contains(TextFormat::ITALIC) {
        "em"
    } else {
        "span"
    }
}

/// Semantic wrapper placed directly around the inner element, if any
fn outer_tag(format: TextFormat) -> Option<&'static str> {
    if format.contains(TextFormat::CODE) {
        Some("code")
    } else if format.contains(TextFormat::HIGHLIGHT) {
        Some("mark")
    } else if format.contains(TextFormat::SUBSCRIPT) {
        Some("sub")
    } else if format.contains(TextFormat::SUPERSCRIPT) {
        Some("sup")
    } else {
        None
    }
}

pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
    let NodeData::Text(text) = data else {
        return Err(mismatch(TYPE, data));
    };

    let mut inner = ExternalElement::new(inner_tag(text.format));
    inner.styles = parse_style_attribute(&text.style);
    inner.set_style("white-space", "pre-wrap");
    inner.children.push(ExternalNode::text(text.text.as_str()));

    let mut node = ExternalNode::Element(inner);
    if let Some(tag) = outer_tag(text.format) {
        node = node.wrapped_in(tag);
    }
    for (flag, tag) in [
        (TextFormat::BOLD, "b"),
        (TextFormat::ITALIC, "i"),
        (TextFormat::STRIKETHROUGH, "s"),
        (TextFormat::UNDERLINE, "u"),
    ] {
        if text.format.contains(flag) {
            node = node.wrapped_in(tag);
        }
    }
    Ok(node)
}

/// Formatting implied by a tag name alone
fn tag_format(tag: &str) -> TextFormat {
    match tag {
        "b" | "strong" => TextFormat::BOLD,
        "i" | "em" => TextFormat::ITALIC,
        "u" => TextFormat::UNDERLINE,
        "s" => TextFormat::STRIKETHROUGH,
        "code" => TextFormat::CODE,
        "mark" => TextFormat::HIGHLIGHT,
        "sub" => TextFormat::SUBSCRIPT,
        "sup" => TextFormat::SUPERSCRIPT,
        _ => TextFormat::empty(),
    }
}

/// Formatting expressed through inline CSS
fn style_format(element: &ExternalElement) -> TextFormat {
    let mut format = TextFormat::empty();
    if let Some(weight) = element.style("font-weight") {
        if weight == "bold" || weight.parse::<u32>().map_or(false, |w| w >= 700) {
            format |= TextFormat::BOLD;
        }
    }
    if element.style("font-style") == Some("italic") {
        format |= TextFormat::ITALIC;
    }
    if let Some(decoration) = element.style("text-decoration") {
        for part in decoration.split_whitespace() {
            match part {
                "underline" => format |= TextFormat::UNDERLINE,
                "line-through" => format |= TextFormat::STRIKETHROUGH,
                _ => {}
            }
        }
    }
    match element.style("vertical-align") {
        Some("sub") => format |= TextFormat::SUBSCRIPT,
        Some("super") => format |= TextFormat::SUPERSCRIPT,
        _ => {}
    }
    format
}

/// Recognizer shared by every text-format tag
pub fn import(element: &ExternalElement) -> Option<DomConversion> {
    let tag = element.tag.to_ascii_lowercase();
    let mut format = tag_format(&tag) | style_format(element);

    // Pasted documents wrap whole bodies in `<b style="font-weight: normal">`
    if tag == "b" && element.style("font-weight") == Some("normal") {
        format.remove(TextFormat::BOLD);
    }

    Some(DomConversion::patch(
        TextPatch {
            format,
            style: extra_styles(element),
        },
        0,
    ))
}

/// Tags accepted by [`import`]
pub const FORMAT_TAGS: &[&str] = &[
    "span", "b", "strong", "i", "em", "u", "s", "code", "mark", "sub", "sup",
];

pub mod linebreak {
    use super::*;

    pub const TYPE: &str = "linebreak";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::LineBreak => Ok(bare_fields(TYPE, VERSION)),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(_value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::LineBreak)
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        match data {
            NodeData::LineBreak => Ok(ExternalNode::element("br")),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn import(_element: &ExternalElement) -> Option<DomConversion> {
        Some(DomConversion::node(NodeData::LineBreak, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_fields_are_complete() {
        let fields = serialize(&NodeData::text("Hello")).unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({
                "detail": 0,
                "format": 0,
                "mode": "normal",
                "style": "",
                "text": "Hello",
                "type": "text",
                "version": 1
            })
        );
    }

    #[test]
    fn test_export_bold_italic_nesting() {
        let text = TextNode::new("Hi").with_format(TextFormat::BOLD | TextFormat::ITALIC);
        let exported = export(&NodeData::Text(text), Vec::new()).unwrap();

        let i = exported.as_element().unwrap();
        assert_eq!(i.tag, "i");
        let b = i.children[0].as_element().unwrap();
        assert_eq!(b.tag, "b");
        let strong = b.children[0].as_element().unwrap();
        assert_eq!(strong.tag, "strong");
        assert_eq!(strong.style("white-space"), Some("pre-wrap"));
        assert_eq!(exported.text_content(), "Hi");
    }

    #[test]
    fn test_export_keeps_node_style() {
        let mut text = TextNode::new("x");
        text.style = "color: rgb(255, 0, 0);".to_string();
        let exported = export(&NodeData::Text(text), Vec::new()).unwrap();
        let span = exported.as_element().unwrap();
        assert_eq!(span.style("color"), Some("rgb(255, 0, 0)"));
    }

    #[test]
    fn test_import_span_styles() {
        let mut span = ExternalElement::new("span");
        span.set_style("font-weight", "700");
        span.set_style("font-size", "20px");
        span.set_style("color", "rgb(0, 0, 0)");

        let conversion = import(&span).unwrap();
        assert!(conversion.node.is_none());
        assert_eq!(conversion.patch.format, TextFormat::BOLD);
        assert_eq!(conversion.patch.style, "font-size: 20px;");
    }

    #[test]
    fn test_import_normal_weight_b() {
        let mut b = ExternalElement::new("b");
        b.set_style("font-weight", "normal");
        assert!(import(&b).unwrap().patch.format.is_empty());
    }
}
