//! # Export/Import Payload
//!
//! The payload is what leaves the editor: the JSON tree for storage, HTML for
//! distribution, and text metrics. Everything in one payload is computed from
//! the same committed snapshot.

use crate::config::ExportConfig;
use crate::errors::{EditorError, EditorResult};
use crate::state::EditorState;
use chrono::{SecondsFormat, Utc};
use folio_compiler_html::{compile_to_html, CompileOptions};
use folio_model::{NodeRegistry, NodeTree};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

/// Exported document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorPayload {
    #[serde(rename = "treeJSON")]
    pub tree_json: String,
    pub html: String,
    /// RFC 3339, UTC, millisecond precision
    pub timestamp: String,
    pub word_count: usize,
    pub character_count: usize,
}

/// Text metrics of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub word_count: usize,
    pub character_count: usize,
}

impl TextMetrics {
    pub fn of(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            character_count: text.chars().count(),
        }
    }
}

/// Serialize a snapshot to the `{"root": ...}` JSON tree
pub fn export_tree_json(state: &EditorState, registry: &NodeRegistry, pretty: bool) -> EditorResult<String> {
    let root = registry.serialize_tree(&state.root_tree())?;
    let document = json!({ "root": root });
    let serialized = if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    };
    serialized.map_err(|e| EditorError::Model(e.into()))
}

/// Render a snapshot to HTML through the registry's exporters
pub fn export_html(state: &EditorState, registry: &NodeRegistry, pretty: bool) -> EditorResult<String> {
    let external = registry.export_tree(&state.root_tree())?;
    let options = CompileOptions {
        pretty,
        ..CompileOptions::default()
    };
    Ok(compile_to_html(&external, options)?)
}

/// Build a payload from one snapshot
pub fn export_payload(
    state: &EditorState,
    registry: &NodeRegistry,
    options: &ExportConfig,
) -> EditorResult<EditorPayload> {
    let tree_json = export_tree_json(state, registry, options.pretty_json)?;
    let html = export_html(state, registry, options.pretty_html)?;
    let metrics = TextMetrics::of(&state.text_content());

    Ok(EditorPayload {
        tree_json,
        html,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        word_count: metrics.word_count,
        character_count: metrics.character_count,
    })
}

/// Parse a JSON tree into a detached root tree.
///
/// Syntax errors are `MalformedInput`; a document without a `root` object of
/// type `root` is `InvalidPayload`; unknown node types abort the whole parse.
pub fn parse_payload(tree_json: &str, registry: &NodeRegistry) -> EditorResult<NodeTree> {
    let document: Value =
        serde_json::from_str(tree_json).map_err(|e| EditorError::MalformedInput(e.to_string()))?;

    let root = document
        .get("root")
        .filter(|root| root.is_object())
        .ok_or_else(|| EditorError::InvalidPayload("missing \"root\" object".to_string()))?;
    match root.get("type").and_then(Value::as_str) {
        Some("root") => {}
        Some(other) => {
            return Err(EditorError::InvalidPayload(format!(
                "root node has type \"{}\"",
                other
            )))
        }
        None => return Err(EditorError::InvalidPayload("root node has no type".to_string())),
    }

    Ok(registry.deserialize_tree(root)?)
}

/// Receives payloads produced by the export command
pub trait PayloadSink {
    fn deliver(&mut self, payload: EditorPayload);
}

/// Logs each payload
#[derive(Debug, Default)]
pub struct TracingSink;

impl PayloadSink for TracingSink {
    fn deliver(&mut self, payload: EditorPayload) {
        info!(
            words = payload.word_count,
            characters = payload.character_count,
            html_bytes = payload.html.len(),
            timestamp = %payload.timestamp,
            "Exported payload"
        );
    }
}

/// Keeps payloads in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    payloads: Rc<RefCell<Vec<EditorPayload>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payloads(&self) -> Vec<EditorPayload> {
        self.payloads.borrow().clone()
    }

    pub fn last(&self) -> Option<EditorPayload> {
        self.payloads.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.payloads.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.borrow().is_empty()
    }
}

impl PayloadSink for MemorySink {
    fn deliver(&mut self, payload: EditorPayload) {
        self.payloads.borrow_mut().push(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_metrics() {
        assert_eq!(
            TextMetrics::of("Hello world"),
            TextMetrics {
                word_count: 2,
                character_count: 11
            }
        );
        assert_eq!(
            TextMetrics::of(""),
            TextMetrics {
                word_count: 0,
                character_count: 0
            }
        );
        assert_eq!(TextMetrics::of("  héllo\n\nwörld ").character_count, 15);
    }

    #[test]
    fn test_empty_state_json() {
        let registry = NodeRegistry::with_defaults();
        let json = export_tree_json(&EditorState::empty(), &registry, false).unwrap();
        assert_eq!(
            json,
            r#"{"root":{"children":[],"direction":null,"format":"","indent":0,"type":"root","version":1}}"#
        );
    }

    #[test]
    fn test_parse_errors() {
        let registry = NodeRegistry::with_defaults();

        assert!(matches!(
            parse_payload("{not json", &registry),
            Err(EditorError::MalformedInput(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"tree": {}}"#, &registry),
            Err(EditorError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_payload(r#"{"root": {"type": "paragraph", "version": 1}}"#, &registry),
            Err(EditorError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_payload(
                r#"{"root": {"type": "root", "version": 1, "children": [{"type": "poll", "version": 1}]}}"#,
                &registry
            ),
            Err(EditorError::UnknownNodeType(tag)) if tag == "poll"
        ));
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.deliver(EditorPayload {
            tree_json: "{}".to_string(),
            html: String::new(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            word_count: 0,
            character_count: 0,
        });
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.last().map(|p| p.tree_json), Some("{}".to_string()));
    }
}
