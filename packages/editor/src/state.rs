//! # Editor State
//!
//! Immutable snapshots of the document tree.
//!
//! Nodes live in a flat map keyed by [`NodeKey`]; parents and children refer
//! to each other by key. A snapshot is never mutated after commit: a
//! transaction copies the records it writes and the commit builds a new map
//! that shares every untouched record with the previous snapshot.

use crate::selection::Selection;
use folio_model::node::DOUBLE_LINE_BREAK;
use folio_model::{ElementAttrs, KeyGenerator, NodeData, NodeKey, NodeTree};
use std::collections::HashMap;
use std::sync::Arc;

/// One node in the document map
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub key: NodeKey,
    /// Navigational only; the map owns the node
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub data: NodeData,
}

impl NodeRecord {
    pub fn new(key: NodeKey, data: NodeData) -> Self {
        Self {
            key,
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

/// Read access to a document tree, shared by committed snapshots and open
/// transactions
pub trait NodeSource {
    fn node(&self, key: &NodeKey) -> Option<&NodeRecord>;

    fn selection(&self) -> Option<&Selection>;

    /// Key the selection starts from
    fn selection_anchor(&self) -> Option<NodeKey> {
        self.selection().map(|selection| selection.anchor_key().clone())
    }

    fn contains(&self, key: &NodeKey) -> bool {
        self.node(key).is_some()
    }

    fn data(&self, key: &NodeKey) -> Option<&NodeData> {
        self.node(key).map(|record| &record.data)
    }

    fn children_of(&self, key: &NodeKey) -> &[NodeKey] {
        self.node(key)
            .map(|record| record.children.as_slice())
            .unwrap_or(&[])
    }

    fn parent_of(&self, key: &NodeKey) -> Option<&NodeKey> {
        self.node(key).and_then(|record| record.parent.as_ref())
    }

    /// Keys of the root's children, in document order
    fn top_level_keys(&self) -> &[NodeKey] {
        self.children_of(&NodeKey::root())
    }

    /// Ancestors from the parent up to the root
    fn ancestors(&self, key: &NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut current = self.parent_of(key);
        while let Some(parent) = current {
            out.push(parent.clone());
            current = self.parent_of(parent);
        }
        out
    }

    /// The root child that contains `key`, or `key` itself when it is one
    fn top_level_ancestor(&self, key: &NodeKey) -> Option<NodeKey> {
        if key.is_root() {
            return None;
        }
        let mut current = key.clone();
        loop {
            let parent = self.parent_of(&current)?;
            if parent.is_root() {
                return Some(current);
            }
            current = parent.clone();
        }
    }

    /// Climb from `key` to the node whose parent is the root or a shadow
    /// root. That node is where block-level insertions happen.
    fn nearest_root_block(&self, key: &NodeKey) -> Option<NodeKey> {
        let mut current = key.clone();
        loop {
            let parent = self.parent_of(&current)?;
            let parent_is_root = self
                .data(parent)
                .map_or(false, |data| data.is_shadow_root());
            if parent_is_root {
                return Some(current);
            }
            current = parent.clone();
        }
    }

    /// Nearest element at or above `key` that is a block (not the root)
    fn enclosing_block(&self, key: &NodeKey) -> Option<NodeKey> {
        let mut current = Some(key.clone());
        while let Some(candidate) = current {
            let data = self.data(&candidate)?;
            if candidate.is_root() {
                return None;
            }
            if (data.is_element() && !data.is_inline()) || data.is_block_decorator() {
                return Some(candidate);
            }
            current = self.parent_of(&candidate).cloned();
        }
        None
    }

    /// `key` and its descendants in pre-order
    fn subtree_keys(&self, key: &NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key.clone()];
        while let Some(current) = stack.pop() {
            if !self.contains(&current) {
                continue;
            }
            stack.extend(self.children_of(&current).iter().rev().cloned());
            out.push(current);
        }
        out
    }

    /// Every key of the document in pre-order
    fn document_order(&self) -> Vec<NodeKey> {
        self.subtree_keys(&NodeKey::root())
    }

    /// Keys from `from` to `to` inclusive in document order, whichever of the
    /// two comes first
    fn keys_between(&self, from: &NodeKey, to: &NodeKey) -> Vec<NodeKey> {
        let order = self.document_order();
        let a = order.iter().position(|k| k == from);
        let b = order.iter().position(|k| k == to);
        match (a, b) {
            (Some(a), Some(b)) => {
                let (start, end) = if a <= b { (a, b) } else { (b, a) };
                order[start..=end].to_vec()
            }
            _ => Vec::new(),
        }
    }

    /// Flattened text, with blank lines between block elements
    fn text_content_of(&self, key: &NodeKey) -> String {
        let Some(record) = self.node(key) else {
            return String::new();
        };
        if !record.data.is_element() {
            return record.data.own_text();
        }
        let mut out = String::new();
        let last = record.children.len().saturating_sub(1);
        for (i, child) in record.children.iter().enumerate() {
            out.push_str(&self.text_content_of(child));
            let is_block = self
                .data(child)
                .map_or(false, |data| data.is_element() && !data.is_inline());
            if is_block && i != last {
                out.push_str(DOUBLE_LINE_BREAK);
            }
        }
        out
    }

    /// Detached copy of the subtree under `key`
    fn tree_of(&self, key: &NodeKey) -> Option<NodeTree> {
        let record = self.node(key)?;
        let children = record
            .children
            .iter()
            .filter_map(|child| self.tree_of(child))
            .collect::<Vec<_>>();
        Some(NodeTree::new(record.data.clone()).with_children(children))
    }
}

/// Committed, immutable document snapshot
#[derive(Debug, Clone)]
pub struct EditorState {
    nodes: Arc<HashMap<NodeKey, Arc<NodeRecord>>>,
    selection: Option<Selection>,
    version: u64,
}

impl EditorState {
    /// Snapshot holding only an empty root
    pub fn empty() -> Self {
        let root = NodeRecord::new(NodeKey::root(), NodeData::Root(ElementAttrs::default()));
        let mut nodes = HashMap::new();
        nodes.insert(root.key.clone(), Arc::new(root));
        Self {
            nodes: Arc::new(nodes),
            selection: None,
            version: 0,
        }
    }

    /// Snapshot of a detached tree whose top node becomes the root. Every
    /// other node gets a fresh key; structure is taken as given.
    pub(crate) fn from_tree(root: &NodeTree, keys: &mut KeyGenerator) -> Self {
        let mut nodes = HashMap::new();
        let mut record = NodeRecord::new(NodeKey::root(), root.data.clone());
        for child in &root.children {
            record.children.push(insert_subtree(&mut nodes, child, &NodeKey::root(), keys));
        }
        nodes.insert(record.key.clone(), Arc::new(record));
        Self::from_parts(nodes, None, 0)
    }

    pub(crate) fn from_parts(
        nodes: HashMap<NodeKey, Arc<NodeRecord>>,
        selection: Option<Selection>,
        version: u64,
    ) -> Self {
        Self {
            nodes: Arc::new(nodes),
            selection,
            version,
        }
    }

    pub(crate) fn nodes(&self) -> &HashMap<NodeKey, Arc<NodeRecord>> {
        &self.nodes
    }

    /// Shared record, for snapshot-to-snapshot identity checks
    pub fn record(&self, key: &NodeKey) -> Option<&Arc<NodeRecord>> {
        self.nodes.get(key)
    }

    /// Number of commits that led to this snapshot
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top_level_keys().is_empty()
    }

    /// Flattened text of the whole document
    pub fn text_content(&self) -> String {
        self.text_content_of(&NodeKey::root())
    }

    /// The whole document as a detached tree
    pub fn root_tree(&self) -> NodeTree {
        self.tree_of(&NodeKey::root())
            .unwrap_or_else(|| NodeTree::new(NodeData::Root(ElementAttrs::default())))
    }
}

fn insert_subtree(
    nodes: &mut HashMap<NodeKey, Arc<NodeRecord>>,
    tree: &NodeTree,
    parent: &NodeKey,
    keys: &mut KeyGenerator,
) -> NodeKey {
    let mut record = NodeRecord::new(keys.next_key(), tree.data.clone());
    record.parent = Some(parent.clone());
    for child in &tree.children {
        let child_key = insert_subtree(nodes, child, &record.key, keys);
        record.children.push(child_key);
    }
    let key = record.key.clone();
    nodes.insert(key.clone(), Arc::new(record));
    key
}

impl Default for EditorState {
    fn default() -> Self {
        Self::empty()
    }
}

impl NodeSource for EditorState {
    fn node(&self, key: &NodeKey) -> Option<&NodeRecord> {
        self.nodes.get(key).map(|record| record.as_ref())
    }

    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(records: Vec<NodeRecord>) -> EditorState {
        let mut nodes = EditorState::empty().nodes().clone();
        for record in records {
            if let Some(parent) = &record.parent {
                let mut parent_record = (*nodes[parent]).clone();
                parent_record.children.push(record.key.clone());
                nodes.insert(parent.clone(), Arc::new(parent_record));
            }
            nodes.insert(record.key.clone(), Arc::new(record));
        }
        EditorState::from_parts(nodes, None, 1)
    }

    fn record(key: &str, parent: &str, data: NodeData) -> NodeRecord {
        let mut record = NodeRecord::new(NodeKey::new(key), data);
        record.parent = Some(NodeKey::new(parent));
        record
    }

    #[test]
    fn test_empty_state() {
        let state = EditorState::empty();
        assert!(state.is_empty());
        assert_eq!(state.len(), 1);
        assert_eq!(state.text_content(), "");
    }

    #[test]
    fn test_navigation() {
        let state = state_with(vec![
            record("grid", "root", NodeData::layout_container("1fr")),
            record("item", "grid", NodeData::layout_item()),
            record("p", "item", NodeData::paragraph()),
            record("t", "p", NodeData::text("Hi")),
        ]);
        let t = NodeKey::new("t");

        assert_eq!(state.top_level_ancestor(&t), Some(NodeKey::new("grid")));
        assert_eq!(state.nearest_root_block(&t), Some(NodeKey::new("p")));
        assert_eq!(state.enclosing_block(&t), Some(NodeKey::new("p")));
        assert_eq!(state.ancestors(&t).len(), 4);
        assert_eq!(
            state.document_order(),
            ["root", "grid", "item", "p", "t"].map(NodeKey::new).to_vec()
        );
        assert_eq!(state.text_content(), "Hi");
    }

    #[test]
    fn test_from_tree_assigns_fresh_keys() {
        let mut keys = KeyGenerator::new("test");
        let tree = NodeTree::new(NodeData::Root(ElementAttrs::default()))
            .with_child(NodeTree::paragraph_with_text("Hello"));
        let state = EditorState::from_tree(&tree, &mut keys);

        assert_eq!(state.len(), 3);
        assert_eq!(state.text_content(), "Hello");
        let p = &state.top_level_keys()[0];
        assert_eq!(state.parent_of(p), Some(&NodeKey::root()));
        assert_eq!(state.root_tree(), tree);
    }

    #[test]
    fn test_keys_between_any_direction() {
        let state = state_with(vec![
            record("p1", "root", NodeData::paragraph()),
            record("a", "p1", NodeData::text("a")),
            record("p2", "root", NodeData::paragraph()),
            record("b", "p2", NodeData::text("b")),
        ]);
        let forward = state.keys_between(&NodeKey::new("a"), &NodeKey::new("b"));
        let backward = state.keys_between(&NodeKey::new("b"), &NodeKey::new("a"));
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
    }
}
