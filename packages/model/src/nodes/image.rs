use super::{from_fields, mismatch, to_fields};
use crate::error::{ModelError, ModelResult};
use crate::external::{ExternalElement, ExternalNode};
use crate::import::DomConversion;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TYPE: &str = "image";
pub const VERSION: u32 = 1;
pub const DEFAULT_MAX_WIDTH: u32 = 500;

fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

/// Image dimensions serialize as `0` when the image keeps its natural size
mod dimension {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(value: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(value.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        // "inherit" and other non-numeric values mean natural size
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_f64()
            .filter(|n| *n > 0.0)
            .map(|n| n.round() as u32))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default, with = "dimension")]
    pub width: Option<u32>,
    #[serde(default, with = "dimension")]
    pub height: Option<u32>,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
}

impl Image {
    pub fn new(src: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt_text: alt_text.into(),
            width: None,
            height: None,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }
}

pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
    match data {
        NodeData::Image(image) => to_fields(TYPE, VERSION, image),
        other => Err(mismatch(TYPE, other)),
    }
}

pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
    if !value.get("src").map_or(false, Value::is_string) {
        return Err(ModelError::invalid_field(TYPE, "src", "expected a string"));
    }
    Ok(NodeData::Image(from_fields(TYPE, value)?))
}

pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
    let NodeData::Image(image) = data else {
        return Err(mismatch(TYPE, data));
    };
    let mut node = ExternalNode::element("img")
        .with_attr("src", image.src.as_str())
        .with_attr("alt", image.alt_text.as_str());
    if let Some(width) = image.width {
        node = node.with_attr("width", width.to_string());
    }
    if let Some(height) = image.height {
        node = node.with_attr("height", height.to_string());
    }
    Ok(node)
}

pub fn import(element: &ExternalElement) -> Option<DomConversion> {
    let src = element.attr("src")?;
    let mut image = Image::new(src, element.attr("alt").unwrap_or_default());
    image.width = element.attr("width").and_then(|w| w.parse().ok());
    image.height = element.attr("height").and_then(|h| h.parse().ok());
    Some(DomConversion::node(NodeData::Image(image), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inherit_dimensions() {
        let data = deserialize(&json!({
            "type": "image",
            "src": "a.png",
            "width": "inherit",
            "height": 0
        }))
        .unwrap();
        let NodeData::Image(image) = &data else {
            panic!("expected an image");
        };
        assert_eq!(image.width, None);
        assert_eq!(image.height, None);
        assert_eq!(image.max_width, 500);

        let fields = serialize(&data).unwrap();
        assert_eq!(fields["width"], json!(0));
        assert_eq!(fields["altText"], json!(""));
    }

    #[test]
    fn test_src_is_required() {
        let err = deserialize(&json!({"type": "image", "altText": "x"})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidField { ref field, .. } if field == "src"));
    }

    #[test]
    fn test_import_reads_dimensions() {
        let element = ExternalNode::element("img")
            .with_attr("src", "b.png")
            .with_attr("alt", "test 1")
            .with_attr("width", "300")
            .with_attr("height", "120");
        let conversion = import(element.as_element().unwrap()).unwrap();
        assert_eq!(
            conversion.node,
            Some(NodeData::Image(Image::new("b.png", "test 1").with_size(300, 120)))
        );
    }
}
