//! # Template Restriction
//!
//! A template is a whole-document layout. Once one sits at the top level it
//! must be the only top-level node.
//!
//! Two mechanisms keep it that way:
//!
//! - [`TemplateIntercept`] runs ahead of the default paragraph and enter
//!   handlers and swallows them when the caret is outside the template.
//! - [`TemplateRestriction`] is a post-effect that removes whatever still
//!   ended up next to the template (paste, programmatic inserts, imports).
//!
//! ```text
//! NoTemplate ──insert template──→ TemplateOnly
//!                                   │   ↑
//!                     sibling added ↓   │ corrective pass
//!                            TemplateWithIntrusion
//! ```

use crate::commands::{Command, CommandContext, CommandHandler, CommandKind, CommandPriority, CommandRegistry};
use crate::editor::UpdateEvent;
use crate::errors::EditorResult;
use crate::mutations::Mutation;
use crate::post_effects::PostEffect;
use crate::state::NodeSource;
use crate::transaction::Transaction;
use folio_model::NodeKey;
use tracing::debug;

/// Structural state of the document's top level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionState {
    NoTemplate,
    TemplateOnly,
    TemplateWithIntrusion,
}

impl RestrictionState {
    pub fn classify(source: &dyn NodeSource) -> Self {
        let top_level = source.top_level_keys();
        let templates = top_level.iter().filter(|key| is_template(source, key)).count();
        match (templates, top_level.len()) {
            (0, _) => RestrictionState::NoTemplate,
            (1, 1) => RestrictionState::TemplateOnly,
            _ => RestrictionState::TemplateWithIntrusion,
        }
    }

    pub fn has_template(self) -> bool {
        self != RestrictionState::NoTemplate
    }
}

fn is_template(source: &dyn NodeSource, key: &NodeKey) -> bool {
    source.data(key).map_or(false, |data| data.is_template())
}

/// Removals that bring an intruded document back to its first template,
/// last sibling first
pub fn corrective_mutations(source: &dyn NodeSource) -> Vec<Mutation> {
    if RestrictionState::classify(source) != RestrictionState::TemplateWithIntrusion {
        return Vec::new();
    }
    let top_level = source.top_level_keys();
    let keep = top_level.iter().find(|key| is_template(source, key));
    top_level
        .iter()
        .rev()
        .filter(|key| Some(*key) != keep)
        .map(|key| Mutation::RemoveNode { key: key.clone() })
        .collect()
}

/// Post-effect removing top-level siblings of a template
#[derive(Debug)]
pub struct TemplateRestriction;

impl TemplateRestriction {
    pub const NAME: &'static str = "template-restriction";
}

impl PostEffect for TemplateRestriction {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn analyze(&self, event: &UpdateEvent) -> Vec<Mutation> {
        let mutations = corrective_mutations(&event.state);
        if !mutations.is_empty() {
            debug!(removals = mutations.len(), "Template intrusion detected");
        }
        mutations
    }
}

/// Blocks paragraph insertion outside the template while one is present
#[derive(Debug)]
pub struct TemplateIntercept;

impl CommandHandler for TemplateIntercept {
    fn handle(
        &self,
        command: &Command,
        tx: &mut Transaction<'_>,
        _ctx: &mut CommandContext<'_>,
    ) -> EditorResult<bool> {
        if !RestrictionState::classify(&*tx).has_template() {
            return Ok(false);
        }
        let Some(selection) = tx.selection().filter(|selection| selection.is_range()) else {
            return Ok(false);
        };

        let inside_template = tx
            .top_level_ancestor(selection.anchor_key())
            .map_or(false, |top| is_template(&*tx, &top));
        if inside_template {
            return Ok(false);
        }

        debug!(command = ?command.kind(), "Suppressed insertion outside template");
        Ok(true)
    }
}

pub(crate) fn register_intercepts(registry: &mut CommandRegistry) {
    for kind in [CommandKind::InsertParagraph, CommandKind::KeyEnter] {
        registry.register(kind, CommandPriority::High, Box::new(TemplateIntercept));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EditorState;
    use folio_model::{KeyGenerator, NodeData, NodeRegistry, NodeTree};

    fn grid() -> NodeTree {
        NodeTree::new(NodeData::layout_container("1fr 1fr"))
            .with_child(NodeTree::new(NodeData::layout_item()))
            .with_child(NodeTree::new(NodeData::layout_item()))
    }

    #[test]
    fn test_classify_states() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();
        let mut tx = Transaction::new(&state, &mut keys, &registry);

        assert_eq!(RestrictionState::classify(&tx), RestrictionState::NoTemplate);

        let p = tx.append_tree(&NodeKey::root(), &NodeTree::paragraph_with_text("x")).unwrap();
        assert_eq!(RestrictionState::classify(&tx), RestrictionState::NoTemplate);

        tx.remove(&p).unwrap();
        tx.append_tree(&NodeKey::root(), &grid()).unwrap();
        assert_eq!(RestrictionState::classify(&tx), RestrictionState::TemplateOnly);

        tx.append_tree(&NodeKey::root(), &NodeTree::new(NodeData::HorizontalRule)).unwrap();
        assert_eq!(RestrictionState::classify(&tx), RestrictionState::TemplateWithIntrusion);
    }

    #[test]
    fn test_corrections_keep_first_template_and_run_backwards() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();
        let mut tx = Transaction::new(&state, &mut keys, &registry);

        let before = tx.append_tree(&NodeKey::root(), &NodeTree::paragraph_with_text("a")).unwrap();
        let template = tx.append_tree(&NodeKey::root(), &grid()).unwrap();
        let second = tx.append_tree(&NodeKey::root(), &grid()).unwrap();
        let after = tx.append_tree(&NodeKey::root(), &NodeTree::paragraph_with_text("b")).unwrap();

        let removals = corrective_mutations(&tx);
        assert_eq!(
            removals,
            vec![
                Mutation::RemoveNode { key: after },
                Mutation::RemoveNode { key: second },
                Mutation::RemoveNode { key: before },
            ]
        );

        for mutation in &removals {
            mutation.apply(&mut tx).unwrap();
        }
        assert_eq!(tx.top_level_keys(), &[template]);
        assert!(corrective_mutations(&tx).is_empty());
    }

    #[test]
    fn test_template_decorator_counts_as_template() {
        let state = EditorState::empty();
        let mut keys = KeyGenerator::new("test");
        let registry = NodeRegistry::with_defaults();
        let mut tx = Transaction::new(&state, &mut keys, &registry);

        tx.append_tree(
            &NodeKey::root(),
            &NodeTree::new(NodeData::Template(folio_model::Template {
                template_id: "contact-support".to_string(),
            })),
        )
        .unwrap();
        assert_eq!(RestrictionState::classify(&tx), RestrictionState::TemplateOnly);
    }
}
