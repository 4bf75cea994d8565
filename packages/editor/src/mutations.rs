//! # Document Mutations
//!
//! Semantic operations on the document tree, addressed by node key.
//!
//! Mutations are what post-effects emit and what hosts send over the wire.
//! Each one validates against the current tree before it touches anything,
//! so a rejected mutation leaves the transaction as it was.
//!
//! ## Mutation Semantics
//!
//! ### RemoveNode
//! - Removes the node and all descendants
//! - Fails on the root
//! - Fails when it would leave a layout container empty
//!
//! ### SetText
//! - Atomic replacement of a text node's content
//!
//! ### SetBackgroundColor
//! - Only `#rrggbb` values are accepted

use crate::errors::EditorResult;
use crate::state::NodeSource;
use crate::transaction::Transaction;
use folio_model::style::is_hex_color;
use folio_model::{ElementFormat, NodeData, NodeKey, TextFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Mutation {
    /// Remove a node and its subtree
    RemoveNode { key: NodeKey },

    /// Replace the content of a text node
    SetText { key: NodeKey, text: String },

    /// Replace the format bits of a text node
    SetTextFormat { key: NodeKey, format: TextFormat },

    /// Set the alignment of an element
    SetElementFormat { key: NodeKey, format: ElementFormat },

    /// Set the background of a layout container
    SetBackgroundColor { key: NodeKey, color: String },

    /// Point an image at a new source
    #[serde(rename_all = "camelCase")]
    SetImageSource {
        key: NodeKey,
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
    },

    /// Remove every top-level node
    ClearRoot,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node {0} is not text")]
    NotText(NodeKey),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeKey),

    #[error("Node {0} is not a layout container")]
    NotLayoutContainer(NodeKey),

    #[error("Node {0} is not an image")]
    NotAnImage(NodeKey),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("The root node cannot be removed")]
    CannotRemoveRoot,
}

impl Mutation {
    /// Key of the node this mutation targets, if any
    pub fn target(&self) -> Option<&NodeKey> {
        match self {
            Mutation::RemoveNode { key }
            | Mutation::SetText { key, .. }
            | Mutation::SetTextFormat { key, .. }
            | Mutation::SetElementFormat { key, .. }
            | Mutation::SetBackgroundColor { key, .. }
            | Mutation::SetImageSource { key, .. } => Some(key),
            Mutation::ClearRoot => None,
        }
    }

    /// Apply mutation to an open transaction with validation
    pub fn apply(&self, tx: &mut Transaction<'_>) -> EditorResult<()> {
        self.validate(&*tx)?;

        match self {
            Mutation::RemoveNode { key } => tx.remove(key),

            Mutation::SetText { key, text } => {
                if let Some(node) = tx.get_writable(key)?.data.as_text_mut() {
                    node.text = text.clone();
                }
                Ok(())
            }

            Mutation::SetTextFormat { key, format } => {
                if let Some(node) = tx.get_writable(key)?.data.as_text_mut() {
                    node.format = *format;
                }
                Ok(())
            }

            Mutation::SetElementFormat { key, format } => {
                Self::apply_element_format(tx, key, *format)
            }

            Mutation::SetBackgroundColor { key, color } => {
                if let NodeData::LayoutContainer(container) = &mut tx.get_writable(key)?.data {
                    container.background_color = color.clone();
                }
                Ok(())
            }

            Mutation::SetImageSource {
                key,
                src,
                alt_text,
                width,
                height,
            } => {
                if let NodeData::Image(image) = &mut tx.get_writable(key)?.data {
                    image.src = src.clone();
                    if let Some(alt_text) = alt_text {
                        image.alt_text = alt_text.clone();
                    }
                    if width.is_some() {
                        image.width = *width;
                    }
                    if height.is_some() {
                        image.height = *height;
                    }
                }
                Ok(())
            }

            Mutation::ClearRoot => tx.clear(),
        }
    }

    fn apply_element_format(tx: &mut Transaction<'_>, key: &NodeKey, format: ElementFormat) -> EditorResult<()> {
        let data = &mut tx.get_writable(key)?.data;
        match data {
            NodeData::Tweet(tweet) => tweet.format = format,
            NodeData::YouTube(video) => video.format = format,
            other => {
                if let Some(attrs) = other.element_attrs_mut() {
                    attrs.format = format;
                }
            }
        }
        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, source: &dyn NodeSource) -> Result<(), MutationError> {
        let Some(key) = self.target() else {
            return Ok(());
        };
        let data = source
            .data(key)
            .ok_or_else(|| MutationError::NodeNotFound(key.clone()))?;

        match self {
            Mutation::RemoveNode { key } => {
                if key.is_root() {
                    return Err(MutationError::CannotRemoveRoot);
                }
                Ok(())
            }

            Mutation::SetText { key, .. } | Mutation::SetTextFormat { key, .. } => match data {
                NodeData::Text(_) => Ok(()),
                _ => Err(MutationError::NotText(key.clone())),
            },

            Mutation::SetElementFormat { key, .. } => {
                if data.element_format().is_some() {
                    Ok(())
                } else {
                    Err(MutationError::NotAnElement(key.clone()))
                }
            }

            Mutation::SetBackgroundColor { key, color } => {
                if !matches!(data, NodeData::LayoutContainer(_)) {
                    return Err(MutationError::NotLayoutContainer(key.clone()));
                }
                if !is_hex_color(color) {
                    return Err(MutationError::InvalidColor(color.clone()));
                }
                Ok(())
            }

            Mutation::SetImageSource { key, .. } => match data {
                NodeData::Image(_) => Ok(()),
                _ => Err(MutationError::NotAnImage(key.clone())),
            },

            Mutation::ClearRoot => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EditorState;
    use folio_model::{KeyGenerator, NodeRegistry, NodeTree};

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::SetText {
            key: NodeKey::new("text-123"),
            text: "Hello World".to_string(),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert!(json.contains(r#""type":"set-text""#));
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_validation_rejects_unknown_keys() {
        let state = EditorState::empty();
        let mutation = Mutation::SetText {
            key: NodeKey::new(""),
            text: "test".to_string(),
        };

        assert_eq!(
            mutation.validate(&state),
            Err(MutationError::NodeNotFound(NodeKey::new("")))
        );
    }

    #[test]
    fn test_validation_rejects_root_removal() {
        let state = EditorState::empty();
        let mutation = Mutation::RemoveNode { key: NodeKey::root() };
        assert_eq!(mutation.validate(&state), Err(MutationError::CannotRemoveRoot));
    }

    #[test]
    fn test_background_color_requires_hex() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();
        let mut tx = Transaction::new(&state, &mut keys, &registry);
        let grid = tx
            .append_tree(
                &NodeKey::root(),
                &NodeTree::new(NodeData::layout_container("1fr"))
                    .with_child(NodeTree::new(NodeData::layout_item())),
            )
            .unwrap();

        let bad = Mutation::SetBackgroundColor {
            key: grid.clone(),
            color: "blue".to_string(),
        };
        assert_eq!(
            bad.validate(&tx),
            Err(MutationError::InvalidColor("blue".to_string()))
        );

        Mutation::SetBackgroundColor {
            key: grid.clone(),
            color: "#eff6ff".to_string(),
        }
        .apply(&mut tx)
        .unwrap();

        match tx.data(&grid) {
            Some(NodeData::LayoutContainer(container)) => {
                assert_eq!(container.background_color, "#eff6ff")
            }
            other => panic!("expected a layout container, got {:?}", other),
        }
    }

    #[test]
    fn test_set_text_rejects_elements() {
        let state = EditorState::empty();
        let mutation = Mutation::SetText {
            key: NodeKey::root(),
            text: "x".to_string(),
        };
        assert_eq!(
            mutation.validate(&state),
            Err(MutationError::NotText(NodeKey::root()))
        );
    }
}
