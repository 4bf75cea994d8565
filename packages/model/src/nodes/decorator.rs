//! Block decorators without content of their own.

use super::{bare_fields, from_fields, mismatch, to_fields};
use crate::error::{ModelError, ModelResult};
use crate::external::{ExternalElement, ExternalNode};
use crate::import::DomConversion;
use crate::node::NodeData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VERSION: u32 = 1;

/// Placeholder for a named template rendered elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub template_id: String,
}

pub mod horizontal_rule {
    use super::*;

    pub const TYPE: &str = "horizontalrule";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::HorizontalRule => Ok(bare_fields(TYPE, VERSION)),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(_value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::HorizontalRule)
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        match data {
            NodeData::HorizontalRule => Ok(ExternalNode::element("hr")),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn import(_element: &ExternalElement) -> Option<DomConversion> {
        Some(DomConversion::node(NodeData::HorizontalRule, 0))
    }
}

pub mod page_break {
    use super::*;

    pub const TYPE: &str = "page-break";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::PageBreak => Ok(bare_fields(TYPE, VERSION)),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(_value: &Value) -> ModelResult<NodeData> {
        Ok(NodeData::PageBreak)
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        match data {
            NodeData::PageBreak => Ok(ExternalNode::element("figure")
                .with_style("page-break-after", "always")
                .with_attr("type", TYPE)),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        if element.attr("type") != Some(TYPE) {
            return None;
        }
        Some(DomConversion::node(NodeData::PageBreak, 3))
    }
}

pub mod template {
    use super::*;

    pub const TYPE: &str = "template";

    pub fn serialize(data: &NodeData) -> ModelResult<Map<String, Value>> {
        match data {
            NodeData::Template(template) => to_fields(TYPE, VERSION, template),
            other => Err(mismatch(TYPE, other)),
        }
    }

    pub fn deserialize(value: &Value) -> ModelResult<NodeData> {
        if !value.get("templateId").map_or(false, Value::is_string) {
            return Err(ModelError::invalid_field(
                TYPE,
                "templateId",
                "expected a string",
            ));
        }
        Ok(NodeData::Template(from_fields(TYPE, value)?))
    }

    pub fn export(data: &NodeData, _children: Vec<ExternalNode>) -> ModelResult<ExternalNode> {
        let NodeData::Template(template) = data else {
            return Err(mismatch(TYPE, data));
        };
        Ok(ExternalNode::element("div").with_attr("data-template-id", template.template_id.as_str()))
    }

    pub fn import(element: &ExternalElement) -> Option<DomConversion> {
        let template_id = element.attr("data-template-id").filter(|id| !id.is_empty())?;
        Some(DomConversion::node(
            NodeData::Template(Template {
                template_id: template_id.to_string(),
            }),
            1,
        ))
    }
}
