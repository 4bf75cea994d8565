//! Per-type codecs: JSON fields, external export and external import.
//!
//! Every node type module exposes `TYPE`, `VERSION` and the four functions the
//! registry wires into a [`crate::registry::NodeTypeEntry`].

pub mod decorator;
pub mod element;
pub mod embed;
pub mod image;
pub mod layout;
pub mod text;

use crate::error::{ModelError, ModelResult};
use crate::node::NodeData;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `fields` and stamp them with `type` and `version`
pub(crate) fn to_fields<T: Serialize>(
    node_type: &str,
    version: u32,
    fields: &T,
) -> ModelResult<Map<String, Value>> {
    let mut map = match serde_json::to_value(fields)? {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(ModelError::invalid_node(
                node_type,
                format!("fields serialized to {} instead of an object", other),
            ))
        }
    };
    map.insert("type".to_string(), Value::String(node_type.to_string()));
    map.insert("version".to_string(), Value::from(version));
    Ok(map)
}

/// Just `type` and `version`, for nodes without fields of their own
pub(crate) fn bare_fields(node_type: &str, version: u32) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(node_type.to_string()));
    map.insert("version".to_string(), Value::from(version));
    map
}

/// Deserialize the fields of one node. Unrelated keys such as `children`
/// are ignored.
pub(crate) fn from_fields<T: DeserializeOwned>(node_type: &str, value: &Value) -> ModelResult<T> {
    if !value.is_object() {
        return Err(ModelError::invalid_node(node_type, "expected a JSON object"));
    }
    serde_json::from_value(value.clone())
        .map_err(|e| ModelError::invalid_node(node_type, e.to_string()))
}

pub(crate) fn mismatch(expected: &'static str, found: &NodeData) -> ModelError {
    ModelError::TypeMismatch {
        expected,
        found: found.type_tag(),
    }
}
