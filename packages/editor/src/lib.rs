//! # Folio Editor
//!
//! Document tree, transactional updates and editing behavior for Folio.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host UI: commands, selection, listeners     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: snapshots + transactions            │
//! │  - Dispatch commands by priority            │
//! │  - Commit atomically, notify listeners      │
//! │  - Correct template intrusion after commit  │
//! │  - Import/export JSON tree and HTML         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: node types + registry                │
//! │ compiler-html: external nodes ⇄ HTML        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Snapshots are immutable**: readers only ever see committed state
//! 2. **One transaction per change**: it commits whole or not at all
//! 3. **Templates own the document**: nothing sits next to one at the top
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Command, Editor};
//!
//! let mut editor = Editor::new();
//!
//! // Install the contact-support layout
//! editor.dispatch(Command::InsertTemplate {
//!     template_id: "contact-support".to_string(),
//! })?;
//!
//! // Export JSON tree, HTML and metrics from one snapshot
//! let payload = editor.export_payload()?;
//!
//! // Restore it later
//! editor.import_payload(&payload.tree_json)?;
//! ```

pub mod commands;
mod config;
mod editor;
mod errors;
mod mutations;
mod payload;
mod post_effects;
mod restriction;
mod selection;
mod state;
mod templates;
mod toolbar;
mod transaction;

pub use commands::{Command, CommandContext, CommandHandler, CommandKind, CommandPriority, CommandRegistry, HandlerId};
pub use config::{EditorConfig, ExportConfig, DEFAULT_CONFIG_NAME};
pub use editor::{Editor, ListenerId, UpdateEvent, UpdateTag};
pub use errors::{EditorError, EditorResult};
pub use mutations::{Mutation, MutationError};
pub use payload::{
    export_html, export_payload, export_tree_json, parse_payload, EditorPayload, MemorySink, PayloadSink,
    TextMetrics, TracingSink,
};
pub use post_effects::{PostEffect, PostEffectEngine};
pub use restriction::{corrective_mutations, RestrictionState, TemplateIntercept, TemplateRestriction};
pub use selection::{Point, Selection};
pub use state::{EditorState, NodeRecord, NodeSource};
pub use templates::{contact_support, template_ids, template_tree, CONTACT_SUPPORT};
pub use toolbar::{BackgroundColorState, ToolbarState};
pub use transaction::Transaction;

// Re-export common types for convenience
pub use folio_model::{NodeData, NodeKey, NodeRegistry, NodeTree};
