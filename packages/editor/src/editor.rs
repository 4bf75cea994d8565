//! # Editor
//!
//! Owns the committed snapshot and everything that reacts to it.
//!
//! ## Update lifecycle
//!
//! ```text
//! update / dispatch / apply / import
//!   ↓
//! Transaction (overlay over the current snapshot)
//!   ↓ finish: validate, build next snapshot
//! commit → listeners (once) → post-effects
//!                               ↓ corrections
//!                             commit (tagged Correction) → listeners
//! ```
//!
//! Everything runs synchronously: when `update` returns, listeners have seen
//! the commit and any corrective commit has landed too.

use crate::commands::{Command, CommandContext, CommandHandler, CommandKind, CommandPriority, CommandRegistry, HandlerId};
use crate::config::EditorConfig;
use crate::errors::EditorResult;
use crate::mutations::Mutation;
use crate::payload::{export_payload, parse_payload, EditorPayload, PayloadSink, TracingSink};
use crate::post_effects::{PostEffect, PostEffectEngine};
use crate::selection::Selection;
use crate::state::EditorState;
use crate::transaction::{Commit, Transaction};
use folio_compiler_html::parse_fragment;
use folio_model::{ElementAttrs, KeyGenerator, NodeData, NodeKey, NodeRegistry, NodeTree};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What caused a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTag {
    Command(CommandKind),
    Mutation,
    Import,
    Clear,
    /// Follow-up commit made by the named post-effect
    Correction(&'static str),
}

/// Delivered to listeners once per commit
#[derive(Debug, Clone)]
pub struct UpdateEvent {
    pub state: EditorState,
    pub prev_state: EditorState,
    /// Keys written, created or removed by the commit
    pub dirty: BTreeSet<NodeKey>,
    pub tags: Vec<UpdateTag>,
}

impl UpdateEvent {
    pub fn has_tag(&self, tag: &UpdateTag) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_correction(&self) -> bool {
        self.tags.iter().any(|tag| matches!(tag, UpdateTag::Correction(_)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&UpdateEvent)>;

pub struct Editor {
    state: EditorState,
    registry: Arc<NodeRegistry>,
    keys: KeyGenerator,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    effects: PostEffectEngine,
    commands: CommandRegistry,
    queue: VecDeque<Command>,
    config: EditorConfig,
    sink: Box<dyn PayloadSink>,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut registry = NodeRegistry::with_defaults();
        if !config.export.strip_presentational {
            registry.clear_export_overrides();
        }
        Self::with_registry(config, Arc::new(registry))
    }

    /// Editor over a caller-provided registry
    pub fn with_registry(config: EditorConfig, registry: Arc<NodeRegistry>) -> Self {
        let mut keys = KeyGenerator::new(&config.namespace);
        let mut root = NodeTree::new(NodeData::Root(ElementAttrs::default()));
        if !config.empty_editor {
            root = root.with_child(NodeTree::new(NodeData::paragraph()));
        }
        let state = EditorState::from_tree(&root, &mut keys);

        Self {
            state,
            registry,
            keys,
            listeners: Vec::new(),
            next_listener: 0,
            effects: PostEffectEngine::new(),
            commands: CommandRegistry::with_defaults(),
            queue: VecDeque::new(),
            config,
            sink: Box::new(TracingSink),
        }
    }

    /// Latest committed snapshot
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Run `f` on the latest committed snapshot
    pub fn read<R>(&self, f: impl FnOnce(&EditorState) -> R) -> R {
        f(&self.state)
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Open a transaction, run `f`, and commit what it changed.
    ///
    /// An error from `f` or from commit validation discards the transaction.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> EditorResult<R>) -> EditorResult<R> {
        self.run(Vec::new(), f)
    }

    fn run<R>(
        &mut self,
        tags: Vec<UpdateTag>,
        f: impl FnOnce(&mut Transaction<'_>) -> EditorResult<R>,
    ) -> EditorResult<R> {
        let (value, commit) = {
            let mut tx = Transaction::new(&self.state, &mut self.keys, &self.registry);
            for tag in tags {
                tx.add_tag(tag);
            }
            let value = f(&mut tx)?;
            (value, tx.finish()?)
        };
        if let Some(commit) = commit {
            self.commit(commit)?;
        }
        Ok(value)
    }

    fn commit(&mut self, commit: Commit) -> EditorResult<()> {
        let prev_state = std::mem::replace(&mut self.state, commit.state);
        let event = UpdateEvent {
            state: self.state.clone(),
            prev_state,
            dirty: commit.dirty,
            tags: commit.tags,
        };
        debug!(
            version = event.state.version(),
            dirty = event.dirty.len(),
            tags = ?event.tags,
            "Committed update"
        );

        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }

        if event.is_correction() {
            return Ok(());
        }
        for (name, mutations) in self.effects.analyze(&event) {
            info!(effect = name, mutations = mutations.len(), "Applying corrective pass");
            self.run(vec![UpdateTag::Correction(name)], |tx| {
                for mutation in &mutations {
                    mutation.apply(tx)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    /// Apply one mutation in its own transaction
    pub fn apply(&mut self, mutation: Mutation) -> EditorResult<()> {
        self.run(vec![UpdateTag::Mutation], |tx| mutation.apply(tx))
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> EditorResult<()> {
        self.update(|tx| {
            tx.set_selection(selection);
            Ok(())
        })
    }

    /// Remove all content, leaving one empty paragraph with the caret in it
    pub fn clear(&mut self) -> EditorResult<()> {
        self.run(vec![UpdateTag::Clear], |tx| {
            tx.clear()?;
            let paragraph = tx.append_tree(&NodeKey::root(), &NodeTree::new(NodeData::paragraph()))?;
            tx.set_selection(Some(Selection::caret(paragraph, 0)));
            Ok(())
        })
    }

    /// Register a listener called once per commit
    pub fn subscribe(&mut self, listener: impl FnMut(&UpdateEvent) + 'static) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Dispatch a command now. Returns whether a handler took it.
    pub fn dispatch(&mut self, command: Command) -> EditorResult<bool> {
        let kind = command.kind();
        let commit = {
            let mut tx = Transaction::new(&self.state, &mut self.keys, &self.registry);
            tx.add_tag(UpdateTag::Command(kind));
            let mut ctx = CommandContext {
                config: &self.config,
                sink: self.sink.as_mut(),
            };
            if !self.commands.dispatch(&command, &mut tx, &mut ctx)? {
                debug!(command = ?kind, "Command not handled");
                return Ok(false);
            }
            tx.finish()?
        };
        if let Some(commit) = commit {
            self.commit(commit)?;
        }
        Ok(true)
    }

    /// Queue a command for [`Editor::flush_commands`]
    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch queued commands in order. Stops at the first error, leaving
    /// the rest queued.
    pub fn flush_commands(&mut self) -> EditorResult<Vec<bool>> {
        let mut results = Vec::with_capacity(self.queue.len());
        while let Some(command) = self.queue.pop_front() {
            results.push(self.dispatch(command)?);
        }
        Ok(results)
    }

    pub fn register_command(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: Box<dyn CommandHandler>,
    ) -> HandlerId {
        self.commands.register(kind, priority, handler)
    }

    pub fn register_command_fn<F>(&mut self, kind: CommandKind, priority: CommandPriority, handler: F) -> HandlerId
    where
        F: Fn(&Command, &mut Transaction<'_>, &mut CommandContext<'_>) -> EditorResult<bool> + 'static,
    {
        self.commands.register_fn(kind, priority, handler)
    }

    pub fn unregister_command(&mut self, id: HandlerId) -> bool {
        self.commands.unregister(id)
    }

    pub fn register_effect(&mut self, effect: Box<dyn PostEffect>) {
        self.effects.register(effect);
    }

    /// Where `Command::ExportPayload` delivers its payload
    pub fn set_payload_sink(&mut self, sink: Box<dyn PayloadSink>) {
        self.sink = sink;
    }

    /// Export the current snapshot
    pub fn export_payload(&self) -> EditorResult<EditorPayload> {
        export_payload(&self.state, &self.registry, &self.config.export)
    }

    /// Replace the document with a JSON tree. On error the document is left
    /// as it was.
    pub fn import_payload(&mut self, tree_json: &str) -> EditorResult<()> {
        let tree = parse_payload(tree_json, &self.registry).map_err(|e| {
            warn!(error = %e, "Rejected payload import");
            e
        })?;
        self.replace_document(&tree)?;
        info!(nodes = tree.size(), "Imported payload");
        Ok(())
    }

    /// Replace the document with the blocks recognized in an HTML fragment
    pub fn import_html(&mut self, html: &str) -> EditorResult<()> {
        let fragment = parse_fragment(html)?;
        let blocks = self.registry.import_external(&fragment);
        let tree = NodeTree::new(NodeData::Root(ElementAttrs::default())).with_children(blocks);
        self.replace_document(&tree)?;
        info!(nodes = tree.size(), "Imported HTML");
        Ok(())
    }

    fn replace_document(&mut self, root: &NodeTree) -> EditorResult<()> {
        self.run(vec![UpdateTag::Import], |tx| {
            tx.clear()?;
            for child in &root.children {
                tx.append_tree(&NodeKey::root(), child)?;
            }
            let root_record = tx.get_writable(&NodeKey::root())?;
            if root_record.data != root.data {
                root_record.data = root.data.clone();
            }
            tx.set_selection(None);
            Ok(())
        })
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("version", &self.state.version())
            .field("nodes", &self.state.len())
            .field("listeners", &self.listeners.len())
            .field("effects", &self.effects)
            .field("commands", &self.commands)
            .field("queued", &self.queue.len())
            .finish()
    }
}
