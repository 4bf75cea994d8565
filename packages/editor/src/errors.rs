//! Error types for the editor

use folio_compiler_html::CompileError;
use folio_model::{ModelError, NodeKey};
use thiserror::Error;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Model error: {0}")]
    Model(ModelError),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeKey),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("HTML error: {0}")]
    Html(#[from] CompileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<ModelError> for EditorError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnknownNodeType(tag) => EditorError::UnknownNodeType(tag),
            other => EditorError::Model(other),
        }
    }
}
