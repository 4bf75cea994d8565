//! Grid layout container and its items.

use super::element::ElementAttrs;
use super::{from_fields, mismatch, to_fields};
use crate::error::{ModelError, ModelResult};
use crate::external::{ExternalElement, ExternalNode};
use crate::import::DomConversion;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION: u32 = 1;
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f9fafb";
pub const GRID_GAP: &str = "20px";

fn default_background_color() -> String {
    DEFAULT_BACKGROUND_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutContainer {
    #[serde(flatten)]
    pub attrs: ElementAttrs,
    /// CSS `grid-template-columns`, e.g. `1fr 3fr`
    pub template_columns: String,
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl LayoutContainer {
    pub fn new(template_columns: impl Into<String>) -> Self {
        Self {
            attrs: ElementAttrs::default(),
            template_columns: template_columns.into(),
            background_color: default_background_color(),
        }
    }

    /// Number of grid columns described by `template_columns`
    pub fn column_count(&self) -> usize {
        self.template_columns.split_whitespace().count()
    }
}

pub mod container {
    use super::*;

    pub const TYPE: &str = "layout-container";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::LayoutContainer(container) => to_fields(TYPE, VERSION, container),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        if !value.get("templateColumns").map_or(false, Value::is_string) {
            return Err(ModelError::invalid_field(
                TYPE,
                "templateColumns",
                "expected a string",
            ));
        }
        let mut container: LayoutContainer = from_fields(TYPE, value)?;
        if container.background_color.is_empty() {
            container.background_color = default_background_color();
        }
        Ok(NodeData::LayoutContainer(container))
    }

    pub fn export(data: &NodeData, children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::LayoutContainer(container) = data else {
            return Err(mismatch(TYPE, data));
        };
        let mut element = ExternalElement::new("div");
        element
            .attributes
            .insert("data-lexical-layout-container".to_string(), "true".to_string());
        element.set_style("display", "grid");
        element.set_style("grid-template-columns", container.template_columns.as_str());
        element.set_style("gap", GRID_GAP);
        element.set_style("background-color", container.background_color.as_str());
        if let Some(align) = container.attrs.format.as_css() {
            element.set_style("text-align", align);
        }
        element.children = children;
        Ok(ExternalNode::Element(element))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        if !element.has_attr("data-lexical-layout-container") {
            return None;
        }
        let mut container = LayoutContainer::new(element.style("grid-template-columns")?);
        if let Some(color) = element.style("background-color") {
            container.background_color = color.to_string();
        }
        Some(DomConversion::node(NodeData::LayoutContainer(container), 2))
    }
}

pub mod item {
    use super::*;

    pub const TYPE: &str = "layout-item";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::LayoutItem(attrs) => to_fields(TYPE, VERSION, attrs),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::LayoutItem(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        if !matches!(data, NodeData::LayoutItem(_)) {
            return Err(mismatch(TYPE, data));
        }
        let mut element = ExternalElement::new("div");
        element
            .attributes
            .insert("data-lexical-layout-item".to_string(), "true".to_string());
        element.children = children;
        Ok(ExternalNode::Element(element))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        if !element.has_attr("data-lexical-layout-item") {
            return None;
        }
        Some(DomConversion::node(NodeData::layout_item(), 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_background_color_defaults() {
        let data = container::deserialize(&json!({
            "type": "layout-container",
            "templateColumns": "1fr 3fr",
            "children": []
        }))
        .unwrap();
        let NodeData::LayoutContainer(container) = data else {
            panic!("expected a layout container");
        };
        assert_eq!(container.background_color, "#f9fafb");
        assert_eq!(container.column_count(), 2);
    }

    #[test]
    fn test_missing_template_columns() {
        let err = container::deserialize(&json!({"type": "layout-container"})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidField { .. }));
    }

    #[test]
    fn test_serialized_field_names() {
        let fields = container::serialize(&NodeData::layout_container("1fr 1fr")).unwrap();
        assert_eq!(fields["templateColumns"], json!("1fr 1fr"));
        assert_eq!(fields["backgroundColor"], json!("#f9fafb"));
        assert_eq!(fields["format"], json!(""));
        assert_eq!(fields["version"], json!(1));
    }

    #[test]
    fn test_export_grid_styles() {
        let exported = container::export(&NodeData::layout_container("1fr 3fr"), Vec::new()).unwrap();
        let div = exported.as_element().unwrap();
        assert_eq!(div.attr("data-lexical-layout-container"), Some("true"));
        assert_eq!(div.style("grid-template-columns"), Some("1fr 3fr"));
        assert_eq!(div.style("gap"), Some("20px"));
        assert_eq!(div.style("background-color"), Some("#f9fafb"));
    }
}
