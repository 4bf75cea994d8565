//! # Command Dispatch
//!
//! Named, typed commands sent by the host UI. Each command is handled inside
//! one transaction by the highest-priority handler that accepts it.
//!
//! ```text
//! dispatch(command)
//!   ↓
//! handlers for command.kind(), Critical → Editor
//!   ↓ first handler returning true
//! commit (tagged Command(kind)) → listeners → post-effects
//! ```
//!
//! If no handler accepts the command, the transaction is dropped and the
//! document is untouched.

pub mod handlers;

use crate::config::EditorConfig;
use crate::errors::EditorResult;
use crate::payload::PayloadSink;
use crate::transaction::Transaction;
use folio_model::{ElementFormat, NodeKey, TextFormatType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Commands the host can dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    InsertHorizontalRule,
    InsertPageBreak,
    #[serde(rename_all = "camelCase")]
    InsertImage {
        src: String,
        #[serde(default)]
        alt_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        width: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_width: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    InsertTemplate { template_id: String },
    InsertTweet { id: String },
    #[serde(rename_all = "camelCase")]
    InsertYoutube { video_id: String },
    InsertParagraph,
    KeyEnter,
    PasteHtml { html: String },
    ClearEditor,
    FormatText { format: TextFormatType },
    FormatElement { format: ElementFormat },
    SetTemplateBackground { color: String },
    ReplaceImage { key: NodeKey, src: String },
    ResetImage { key: NodeKey },
    ExportPayload,
}

/// Payload-free identity of a command, used to route it to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    InsertHorizontalRule,
    InsertPageBreak,
    InsertImage,
    InsertTemplate,
    InsertTweet,
    InsertYoutube,
    InsertParagraph,
    KeyEnter,
    PasteHtml,
    ClearEditor,
    FormatText,
    FormatElement,
    SetTemplateBackground,
    ReplaceImage,
    ResetImage,
    ExportPayload,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::InsertHorizontalRule => CommandKind::InsertHorizontalRule,
            Command::InsertPageBreak => CommandKind::InsertPageBreak,
            Command::InsertImage { .. } => CommandKind::InsertImage,
            Command::InsertTemplate { .. } => CommandKind::InsertTemplate,
            Command::InsertTweet { .. } => CommandKind::InsertTweet,
            Command::InsertYoutube { .. } => CommandKind::InsertYoutube,
            Command::InsertParagraph => CommandKind::InsertParagraph,
            Command::KeyEnter => CommandKind::KeyEnter,
            Command::PasteHtml { .. } => CommandKind::PasteHtml,
            Command::ClearEditor => CommandKind::ClearEditor,
            Command::FormatText { .. } => CommandKind::FormatText,
            Command::FormatElement { .. } => CommandKind::FormatElement,
            Command::SetTemplateBackground { .. } => CommandKind::SetTemplateBackground,
            Command::ReplaceImage { .. } => CommandKind::ReplaceImage,
            Command::ResetImage { .. } => CommandKind::ResetImage,
            Command::ExportPayload => CommandKind::ExportPayload,
        }
    }
}

/// Handler priority. Higher priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandPriority {
    Editor,
    Low,
    Normal,
    High,
    Critical,
}

/// Collaborators a handler may need besides the tree
pub struct CommandContext<'a> {
    pub config: &'a EditorConfig,
    pub sink: &'a mut dyn PayloadSink,
}

/// Handles one command inside an open transaction.
///
/// Returns `true` when the command was handled; dispatch stops there.
pub trait CommandHandler {
    fn handle(
        &self,
        command: &Command,
        tx: &mut Transaction<'_>,
        ctx: &mut CommandContext<'_>,
    ) -> EditorResult<bool>;
}

struct FnHandler<F>(F);

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&Command, &mut Transaction<'_>, &mut CommandContext<'_>) -> EditorResult<bool>,
{
    fn handle(
        &self,
        command: &Command,
        tx: &mut Transaction<'_>,
        ctx: &mut CommandContext<'_>,
    ) -> EditorResult<bool> {
        (self.0)(command, tx, ctx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Registration {
    id: HandlerId,
    priority: CommandPriority,
    handler: Box<dyn CommandHandler>,
}

/// Handlers by command kind, each list kept in dispatch order
#[derive(Default)]
pub struct CommandRegistry {
    handlers: BTreeMap<CommandKind, Vec<Registration>>,
    next_id: u64,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the editor's own handlers and the template intercepts
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        handlers::register_defaults(&mut registry);
        crate::restriction::register_intercepts(&mut registry);
        registry
    }

    /// Register a handler. Among equal priorities, earlier registrations
    /// run first.
    pub fn register(
        &mut self,
        kind: CommandKind,
        priority: CommandPriority,
        handler: Box<dyn CommandHandler>,
    ) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        let list = self.handlers.entry(kind).or_default();
        let index = list
            .iter()
            .position(|registration| registration.priority < priority)
            .unwrap_or(list.len());
        list.insert(
            index,
            Registration {
                id,
                priority,
                handler,
            },
        );
        id
    }

    /// Register a closure as a handler
    pub fn register_fn<F>(&mut self, kind: CommandKind, priority: CommandPriority, handler: F) -> HandlerId
    where
        F: Fn(&Command, &mut Transaction<'_>, &mut CommandContext<'_>) -> EditorResult<bool> + 'static,
    {
        self.register(kind, priority, Box::new(FnHandler(handler)))
    }

    /// Remove a handler. Returns false when the id is unknown.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(index) = list.iter().position(|registration| registration.id == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self, kind: CommandKind) -> usize {
        self.handlers.get(&kind).map_or(0, Vec::len)
    }

    /// Run handlers for `command` until one reports it handled
    pub fn dispatch(
        &self,
        command: &Command,
        tx: &mut Transaction<'_>,
        ctx: &mut CommandContext<'_>,
    ) -> EditorResult<bool> {
        let kind = command.kind();
        let Some(list) = self.handlers.get(&kind) else {
            debug!(command = ?kind, "No handlers registered");
            return Ok(false);
        };

        for registration in list {
            if registration.handler.handle(command, tx, ctx)? {
                debug!(command = ?kind, priority = ?registration.priority, "Command handled");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: BTreeMap<_, _> = self
            .handlers
            .iter()
            .map(|(kind, list)| (kind, list.len()))
            .collect();
        f.debug_struct("CommandRegistry").field("handlers", &counts).finish()
    }
}
