//! Root, paragraph and heading: the plain block elements.

use super::{from_fields, mismatch, to_fields};
use crate::error::{ModelError, ModelResult};
use crate::external::{ExternalElement, ExternalNode};
use crate::format::{Direction, ElementFormat};
use crate::import::DomConversion;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION: u32 = 1;

/// Attributes shared by every element node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementAttrs {
    pub direction: Option<Direction>,
    pub format: ElementFormat,
    pub indent: u32,
}

impl ElementAttrs {
    /// Apply `dir` and `text-align` to an exported element
    fn export_onto(&self, element: &mut ExternalElement) {
        if let Some(direction) = self.direction {
            element
                .attributes
                .insert("dir".to_string(), direction.as_str().to_string());
        }
        if let Some(align) = self.format.as_css() {
            element.set_style("text-align", align);
        }
    }

    fn import_from(element: &ExternalElement) -> Self {
        let direction = match element.attr("dir") {
            Some("ltr") => Some(Direction::Ltr),
            Some("rtl") => Some(Direction::Rtl),
            _ => None,
        };
        let format = element
            .style("text-align")
            .map(ElementFormat::from_css)
            .unwrap_or_default();
        Self {
            direction,
            format,
            indent: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingTag {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingTag {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingTag::H1 => "h1",
            HeadingTag::H2 => "h2",
            HeadingTag::H3 => "h3",
            HeadingTag::H4 => "h4",
            HeadingTag::H5 => "h5",
            HeadingTag::H6 => "h6",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(HeadingTag::H1),
            "h2" => Some(HeadingTag::H2),
            "h3" => Some(HeadingTag::H3),
            "h4" => Some(HeadingTag::H4),
            "h5" => Some(HeadingTag::H5),
            "h6" => Some(HeadingTag::H6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    #[serde(flatten)]
    pub attrs: ElementAttrs,
    pub tag: HeadingTag,
}

impl Heading {
    pub fn new(tag: HeadingTag) -> Self {
        Self {
            attrs: ElementAttrs::default(),
            tag,
        }
    }
}

pub mod root {
    use super::*;

    pub const TYPE: &str = "root";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::Root(attrs) => to_fields(TYPE, VERSION, attrs),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::Root(from_fields(TYPE, value)?))
    }
}

pub mod paragraph {
    use super::*;

    pub const TYPE: &str = "paragraph";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::Paragraph(attrs) => to_fields(TYPE, VERSION, attrs),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::Paragraph(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::Paragraph(attrs) = data else {
            return Err(mismatch(TYPE, data));
        };
        let mut element = ExternalElement::new("p");
        attrs.export_onto(&mut element);
        element.children = block_children(children);
        Ok(ExternalNode::Element(element))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        Some(DomConversion::node(
            NodeData::Paragraph(ElementAttrs::import_from(element)),
            0,
        ))
    }
}

pub mod heading {
    use super::*;

    pub const TYPE: &str = "heading";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::Heading(heading) => to_fields(TYPE, VERSION, heading),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        let tag = value.get("tag").and_then(Value::as_str).unwrap_or_default();
        if HeadingTag::parse(tag).is_none() {
            return Err(ModelError::invalid_field(
                TYPE,
                "tag",
                format!("expected h1 to h6, found {:?}", tag),
            ));
        }
        Ok(NodeData::Heading(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::Heading(heading) = data else {
            return Err(mismatch(TYPE, data));
        };
        let mut element = ExternalElement::new(heading.tag.as_str());
        heading.attrs.export_onto(&mut element);
        element.children = block_children(children);
        Ok(ExternalNode::Element(element))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        let tag = HeadingTag::parse(&element.tag.to_ascii_lowercase())?;
        Some(DomConversion::node(
            NodeData::Heading(Heading {
                attrs: ElementAttrs::import_from(element),
                tag,
            }),
            0,
        ))
    }
}

/// Empty blocks export a `<br>` so they keep their height when rendered
fn block_children(children: Vec<ExternalNode>) -> Vec<ExternalNode> {
    if children.is_empty() {
        vec![ExternalNode::element("br")]
    } else {
        children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paragraph_fields() {
        let fields = paragraph::serialize(&NodeData::paragraph()).unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({"direction": null, "format": "", "indent": 0, "type": "paragraph", "version": 1})
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let data = paragraph::deserialize(&json!({"type": "paragraph"})).unwrap();
        assert_eq!(data, NodeData::paragraph());
    }

    #[test]
    fn test_heading_rejects_bad_tag() {
        let err = heading::deserialize(&json!({"type": "heading", "tag": "h9"})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidField { ref field, .. } if field == "tag"));
    }

    #[test]
    fn test_empty_paragraph_exports_br() {
        let mut data = NodeData::paragraph();
        data.element_attrs_mut().unwrap().format = ElementFormat::Center;

        let exported = paragraph::export(&data, Vec::new()).unwrap();
        let p = exported.as_element().unwrap();
        assert_eq!(p.style("text-align"), Some("center"));
        assert_eq!(p.children, vec![ExternalNode::element("br")]);
    }

    #[test]
    fn test_wrong_variant_is_a_mismatch() {
        let err = root::serialize(&NodeData::paragraph()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::TypeMismatch {
                expected: "root",
                found: "paragraph"
            }
        ));
    }
}
