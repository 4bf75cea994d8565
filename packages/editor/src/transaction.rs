//! # Update Transactions
//!
//! A transaction is a copy-on-write overlay over one committed snapshot.
//! Reads fall through to the snapshot until a record is written; the first
//! write clones the record into the overlay under the same key. Committing
//! builds a new node map from the snapshot plus the overlay, so readers of
//! the old snapshot never observe a partial change.

use crate::errors::{EditorError, EditorResult};
use crate::selection::Selection;
use crate::state::{EditorState, NodeRecord, NodeSource};
use crate::UpdateTag;
use folio_model::{KeyGenerator, NodeData, NodeKey, NodeRegistry, NodeTree};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
enum Slot {
    Live(NodeRecord),
    Removed,
}

/// Open mutation scope over a committed snapshot
pub struct Transaction<'a> {
    base: &'a EditorState,
    keys: &'a mut KeyGenerator,
    registry: &'a NodeRegistry,
    overlay: HashMap<NodeKey, Slot>,
    selection: Option<Selection>,
    selection_changed: bool,
    tags: Vec<UpdateTag>,
}

/// Validated result of a transaction, ready to become the next snapshot
#[derive(Debug)]
pub(crate) struct Commit {
    pub state: EditorState,
    pub dirty: BTreeSet<NodeKey>,
    pub tags: Vec<UpdateTag>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(
        base: &'a EditorState,
        keys: &'a mut KeyGenerator,
        registry: &'a NodeRegistry,
    ) -> Self {
        Self {
            base,
            keys,
            registry,
            overlay: HashMap::new(),
            selection: base.selection().cloned(),
            selection_changed: false,
            tags: Vec::new(),
        }
    }

    /// Snapshot the transaction started from
    pub fn base(&self) -> &EditorState {
        self.base
    }

    pub fn registry(&self) -> &NodeRegistry {
        self.registry
    }

    pub fn add_tag(&mut self, tag: UpdateTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.overlay.is_empty() || self.selection_changed
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        if self.selection != selection {
            self.selection = selection;
            self.selection_changed = true;
        }
    }

    /// Record of `key`, or `NodeNotFound`
    pub fn get(&self, key: &NodeKey) -> EditorResult<&NodeRecord> {
        self.node(key)
            .ok_or_else(|| EditorError::NodeNotFound(key.clone()))
    }

    /// Writable copy of `key`. The first call clones the committed record
    /// into this transaction; the key stays the same.
    pub fn get_writable(&mut self, key: &NodeKey) -> EditorResult<&mut NodeRecord> {
        if !self.overlay.contains_key(key) {
            let record = self
                .base
                .node(key)
                .ok_or_else(|| EditorError::NodeNotFound(key.clone()))?
                .clone();
            self.overlay.insert(key.clone(), Slot::Live(record));
        }
        match self.overlay.get_mut(key) {
            Some(Slot::Live(record)) => Ok(record),
            _ => Err(EditorError::NodeNotFound(key.clone())),
        }
    }

    /// Create a detached node with a fresh key
    pub fn create(&mut self, data: NodeData) -> NodeKey {
        let key = self.keys.next_key();
        self.overlay
            .insert(key.clone(), Slot::Live(NodeRecord::new(key.clone(), data)));
        key
    }

    /// Append `child` as the last child of `parent`
    pub fn append(&mut self, parent: &NodeKey, child: &NodeKey) -> EditorResult<()> {
        let index = self.children_of(parent).len();
        self.insert_at(parent, index, child)
    }

    /// Insert `child` into `parent` at `index` (clamped), detaching it from
    /// any current parent first
    pub fn insert_at(&mut self, parent: &NodeKey, index: usize, child: &NodeKey) -> EditorResult<()> {
        if !self.get(parent)?.data.is_element() {
            return Err(EditorError::NotAnElement(parent.clone()));
        }
        if child.is_root() || parent == child || self.ancestors(parent).contains(child) {
            return Err(EditorError::InvariantViolation(format!(
                "cannot insert {} into its own subtree",
                child
            )));
        }
        self.detach(child)?;

        let parent_record = self.get_writable(parent)?;
        let index = index.min(parent_record.children.len());
        parent_record.children.insert(index, child.clone());
        self.get_writable(child)?.parent = Some(parent.clone());
        Ok(())
    }

    /// Insert `node` right after `sibling`
    pub fn insert_after(&mut self, sibling: &NodeKey, node: &NodeKey) -> EditorResult<()> {
        let parent = self
            .parent_of(sibling)
            .cloned()
            .ok_or_else(|| EditorError::InvariantViolation(format!("{} has no parent", sibling)))?;
        let index = self
            .children_of(&parent)
            .iter()
            .position(|k| k == sibling)
            .map_or(0, |i| i + 1);
        if self.children_of(&parent).get(index) == Some(node) {
            return Ok(());
        }
        self.insert_at(&parent, index, node)
    }

    /// Materialize a detached tree under `parent` at `index`
    pub fn insert_tree(&mut self, parent: &NodeKey, index: usize, tree: &NodeTree) -> EditorResult<NodeKey> {
        let key = self.create(tree.data.clone());
        for child in &tree.children {
            let child_index = self.children_of(&key).len();
            self.insert_tree(&key, child_index, child)?;
        }
        self.insert_at(parent, index, &key)?;
        Ok(key)
    }

    /// Append a detached tree as the last child of `parent`
    pub fn append_tree(&mut self, parent: &NodeKey, tree: &NodeTree) -> EditorResult<NodeKey> {
        let index = self.children_of(parent).len();
        self.insert_tree(parent, index, tree)
    }

    /// Detach `key` from its parent and drop it with all descendants.
    ///
    /// Refuses to take the last child away from a container that cannot be
    /// empty.
    pub fn remove(&mut self, key: &NodeKey) -> EditorResult<()> {
        if key.is_root() {
            return Err(EditorError::InvariantViolation("the root cannot be removed".to_string()));
        }
        if let Some(parent) = self.get(key)?.parent.clone() {
            let parent_record = self.get(&parent)?;
            if !parent_record.data.can_be_empty() && parent_record.children.len() <= 1 {
                return Err(EditorError::InvariantViolation(format!(
                    "{} {} cannot be left empty",
                    parent_record.data.type_tag(),
                    parent
                )));
            }
        }

        let subtree = self.subtree_keys(key);
        self.detach(key)?;
        for removed in subtree {
            self.overlay.insert(removed, Slot::Removed);
        }
        Ok(())
    }

    /// Remove every child of the root
    pub fn clear(&mut self) -> EditorResult<()> {
        let root = NodeKey::root();
        let children = self.children_of(&root).to_vec();
        for child in &children {
            for removed in self.subtree_keys(child) {
                self.overlay.insert(removed, Slot::Removed);
            }
        }
        if !children.is_empty() {
            self.get_writable(&root)?.children.clear();
        }
        Ok(())
    }

    fn detach(&mut self, key: &NodeKey) -> EditorResult<()> {
        let Some(parent) = self.get(key)?.parent.clone() else {
            return Ok(());
        };
        let parent_record = self.get_writable(&parent)?;
        parent_record.children.retain(|child| child != key);
        self.get_writable(key)?.parent = None;
        Ok(())
    }

    /// Validate and build the next snapshot. `None` when nothing changed.
    pub(crate) fn finish(self) -> EditorResult<Option<Commit>> {
        if !self.has_changes() {
            return Ok(None);
        }

        let mut nodes = self.base.nodes().clone();
        for (key, slot) in &self.overlay {
            match slot {
                Slot::Live(record) => {
                    nodes.insert(key.clone(), Arc::new(record.clone()));
                }
                Slot::Removed => {
                    nodes.remove(key);
                }
            }
        }

        // Nodes created but never attached are dropped with their subtrees
        let orphans: Vec<NodeKey> = self
            .overlay
            .iter()
            .filter(|(key, slot)| {
                matches!(slot, Slot::Live(_)) && !is_attached(&nodes, key)
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in &orphans {
            nodes.remove(key);
        }
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "Dropping detached nodes");
        }

        for key in self.overlay.keys() {
            if let Some(record) = nodes.get(key) {
                if !record.data.can_be_empty() && record.children.is_empty() {
                    return Err(EditorError::InvariantViolation(format!(
                        "{} {} was left empty",
                        record.data.type_tag(),
                        key
                    )));
                }
            }
        }

        let selection = self
            .selection
            .filter(|selection| selection.keys().iter().all(|key| nodes.contains_key(*key)));

        let dirty: BTreeSet<NodeKey> = self.overlay.into_keys().collect();
        let state = EditorState::from_parts(nodes, selection, self.base.version() + 1);

        Ok(Some(Commit {
            state,
            dirty,
            tags: self.tags,
        }))
    }
}

fn is_attached(nodes: &HashMap<NodeKey, Arc<NodeRecord>>, key: &NodeKey) -> bool {
    let mut current = key;
    loop {
        if current.is_root() {
            return true;
        }
        match nodes.get(current).and_then(|record| record.parent.as_ref()) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

impl NodeSource for Transaction<'_> {
    fn node(&self, key: &NodeKey) -> Option<&NodeRecord> {
        match self.overlay.get(key) {
            Some(Slot::Live(record)) => Some(record),
            Some(Slot::Removed) => None,
            None => self.base.node(key),
        }
    }

    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open<'a>(
        state: &'a EditorState,
        keys: &'a mut KeyGenerator,
        registry: &'a NodeRegistry,
    ) -> Transaction<'a> {
        Transaction::new(state, keys, registry)
    }

    #[test]
    fn test_untouched_transaction_does_not_commit() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let tx = open(&state, &mut keys, &registry);
        assert!(tx.finish().unwrap().is_none());
    }

    #[test]
    fn test_writable_copy_leaves_base_untouched() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let p = tx.create(NodeData::paragraph());
        tx.append(&NodeKey::root(), &p).unwrap();
        let commit = tx.finish().unwrap().unwrap();

        assert!(state.is_empty());
        assert_eq!(commit.state.top_level_keys(), &[p.clone()]);
        assert_eq!(commit.state.version(), 1);
        assert!(commit.dirty.contains(&p));
        assert!(commit.dirty.contains(&NodeKey::root()));
    }

    #[test]
    fn test_remove_last_child_of_container_is_rejected() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let grid = tx.append_tree(
            &NodeKey::root(),
            &NodeTree::new(NodeData::layout_container("1fr")).with_child(NodeTree::new(NodeData::layout_item())),
        )
        .unwrap();
        let item = tx.children_of(&grid)[0].clone();

        let err = tx.remove(&item).unwrap_err();
        assert!(matches!(err, EditorError::InvariantViolation(_)));
        assert_eq!(tx.children_of(&grid).len(), 1);
    }

    #[test]
    fn test_empty_container_fails_commit() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let grid = tx.create(NodeData::layout_container("1fr"));
        tx.append(&NodeKey::root(), &grid).unwrap();

        assert!(matches!(tx.finish(), Err(EditorError::InvariantViolation(_))));
    }

    #[test]
    fn test_remove_drops_subtree_and_selection() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let p = tx
            .append_tree(&NodeKey::root(), &NodeTree::paragraph_with_text("Hi"))
            .unwrap();
        let text = tx.children_of(&p)[0].clone();
        tx.set_selection(Some(Selection::caret(text.clone(), 1)));
        tx.remove(&p).unwrap();

        assert!(!tx.contains(&text));
        let commit = tx.finish().unwrap().unwrap();
        assert!(commit.state.selection().is_none());
        assert!(commit.state.is_empty());
    }

    #[test]
    fn test_detached_nodes_are_dropped() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let stray = tx.create(NodeData::paragraph());
        let kept = tx.create(NodeData::paragraph());
        tx.append(&NodeKey::root(), &kept).unwrap();
        let commit = tx.finish().unwrap().unwrap();

        assert!(commit.state.node(&stray).is_none());
        assert!(commit.state.node(&kept).is_some());
    }

    #[test]
    fn test_cannot_insert_into_own_subtree() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();

        let mut tx = open(&state, &mut keys, &registry);
        let item = tx.append_tree(&NodeKey::root(), &NodeTree::new(NodeData::layout_item())).unwrap();
        let inner = tx.create(NodeData::paragraph());
        tx.append(&item, &inner).unwrap();

        assert!(tx.append(&inner, &item).is_err());
    }
}
