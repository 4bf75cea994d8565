use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Serialized node has no \"type\" field")]
    MissingType,

    #[error("Invalid field `{field}` on {node_type} node: {message}")]
    InvalidField {
        node_type: String,
        field: String,
        message: String,
    },

    #[error("Invalid {node_type} node: {message}")]
    InvalidNode { node_type: String, message: String },

    #[error("Expected a {expected} node, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid_field(
        node_type: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            node_type: node_type.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_node(node_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            node_type: node_type.into(),
            message: message.into(),
        }
    }
}
