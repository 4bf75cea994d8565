//! Default command handlers, registered at `CommandPriority::Editor`.

use super::{Command, CommandContext, CommandKind, CommandPriority, CommandRegistry};
use crate::errors::EditorResult;
use crate::mutations::Mutation;
use crate::payload::export_payload;
use crate::selection::Selection;
use crate::state::NodeSource;
use crate::templates::template_tree;
use crate::transaction::Transaction;
use folio_compiler_html::parse_fragment;
use folio_model::style::is_hex_color;
use folio_model::{Image, NodeData, NodeKey, NodeTree, TextFormat, Tweet, YouTube};
use tracing::debug;

pub const IMAGE_PLACEHOLDER_SRC: &str =
    "https://images.unsplash.com/photo-1511367461989-f85a21fda167?w=300&h=120&fit=crop&crop=faces";
pub const IMAGE_PLACEHOLDER_ALT: &str = "Placeholder - Click to add image";
pub const IMAGE_MENU_WIDTH: u32 = 300;
pub const IMAGE_MENU_HEIGHT: u32 = 120;

pub(crate) fn register_defaults(registry: &mut CommandRegistry) {
    let defaults: [(CommandKind, HandlerFn); 16] = [
        (CommandKind::InsertHorizontalRule, insert_decorator),
        (CommandKind::InsertPageBreak, insert_decorator),
        (CommandKind::InsertTweet, insert_decorator),
        (CommandKind::InsertYoutube, insert_decorator),
        (CommandKind::InsertImage, insert_image),
        (CommandKind::InsertTemplate, insert_template),
        (CommandKind::InsertParagraph, insert_paragraph),
        (CommandKind::KeyEnter, insert_paragraph),
        (CommandKind::PasteHtml, paste_html),
        (CommandKind::ClearEditor, clear_editor),
        (CommandKind::FormatText, format_text),
        (CommandKind::FormatElement, format_element),
        (CommandKind::SetTemplateBackground, set_template_background),
        (CommandKind::ReplaceImage, update_image),
        (CommandKind::ResetImage, update_image),
        (CommandKind::ExportPayload, export),
    ];
    for (kind, handler) in defaults {
        registry.register_fn(kind, CommandPriority::Editor, handler);
    }
}

type HandlerFn = fn(&Command, &mut Transaction<'_>, &mut CommandContext<'_>) -> EditorResult<bool>;

fn insert_decorator(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let data = match command {
        Command::InsertHorizontalRule => NodeData::HorizontalRule,
        Command::InsertPageBreak => NodeData::PageBreak,
        Command::InsertTweet { id } if !id.is_empty() => NodeData::Tweet(Tweet::new(id.clone())),
        Command::InsertYoutube { video_id } if !video_id.is_empty() => {
            NodeData::YouTube(YouTube::new(video_id.clone()))
        }
        _ => return Ok(false),
    };
    insert_blocks_at_nearest_root(tx, &[NodeTree::new(data)])?;
    Ok(true)
}

fn insert_image(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Command::InsertImage {
        src,
        alt_text,
        width,
        height,
        max_width,
    } = command
    else {
        return Ok(false);
    };

    let mut image = Image::new(src.clone(), alt_text.clone());
    image.width = *width;
    image.height = *height;
    if let Some(max_width) = max_width {
        image = image.with_max_width(*max_width);
    }

    let paragraph = NodeTree::new(NodeData::paragraph()).with_child(NodeTree::new(NodeData::Image(image)));
    let inserted = insert_blocks_at_nearest_root(tx, &[paragraph])?;
    if let Some(paragraph) = inserted.last() {
        tx.set_selection(Some(Selection::caret(paragraph.clone(), 1)));
    }
    Ok(true)
}

fn insert_template(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Command::InsertTemplate { template_id } = command else {
        return Ok(false);
    };
    let Some(tree) = template_tree(template_id) else {
        debug!(template_id = %template_id, "Unknown template");
        return Ok(false);
    };

    tx.clear()?;
    let container = tx.append_tree(&NodeKey::root(), &tree)?;

    let first_text = tx
        .subtree_keys(&container)
        .into_iter()
        .find(|key| matches!(tx.data(key), Some(NodeData::Text(_))));
    tx.set_selection(first_text.map(|key| Selection::caret(key, 0)));
    Ok(true)
}

/// Empty paragraph after the anchor's block, or inside the anchor when it
/// is a layout item. Requires a range selection.
fn insert_paragraph(_command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Some(anchor) = tx
        .selection()
        .filter(|selection| selection.is_range())
        .map(|selection| selection.anchor_key().clone())
    else {
        return Ok(false);
    };
    let Some(anchor_data) = tx.data(&anchor).cloned() else {
        return Ok(false);
    };

    let paragraph = if anchor.is_root() {
        tx.append_tree(&NodeKey::root(), &NodeTree::new(NodeData::paragraph()))?
    } else if anchor_data.is_shadow_root() && anchor_data.can_be_empty() {
        tx.append_tree(&anchor, &NodeTree::new(NodeData::paragraph()))?
    } else {
        let Some(block) = tx.enclosing_block(&anchor) else {
            return Ok(false);
        };
        let paragraph = tx.create(NodeData::paragraph());
        tx.insert_after(&block, &paragraph)?;
        paragraph
    };

    tx.set_selection(Some(Selection::caret(paragraph, 0)));
    Ok(true)
}

fn paste_html(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Command::PasteHtml { html } = command else {
        return Ok(false);
    };
    let fragment = parse_fragment(html)?;
    let trees = tx.registry().import_external(&fragment);
    if trees.is_empty() {
        return Ok(false);
    }
    debug!(blocks = trees.len(), "Pasting imported blocks");
    insert_blocks_at_nearest_root(tx, &trees)?;
    Ok(true)
}

fn clear_editor(_command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    tx.clear()?;
    let paragraph = tx.append_tree(&NodeKey::root(), &NodeTree::new(NodeData::paragraph()))?;
    tx.set_selection(Some(Selection::caret(paragraph, 0)));
    Ok(true)
}

/// Toggle a format over every text node between anchor and focus. When all
/// of them already carry it, it is removed from all of them.
fn format_text(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Command::FormatText { format } = command else {
        return Ok(false);
    };
    let Some(selection) = tx.selection().filter(|selection| selection.is_range()).cloned() else {
        return Ok(false);
    };

    let texts: Vec<(NodeKey, TextFormat)> = tx
        .keys_between(selection.anchor_key(), selection.focus_key())
        .into_iter()
        .filter_map(|key| {
            let current = tx.data(&key)?.text_format()?;
            Some((key, current))
        })
        .collect();
    if texts.is_empty() {
        return Ok(false);
    }

    let flag = format.flag();
    let all_have = texts.iter().all(|(_, current)| current.contains(flag));
    for (key, current) in texts {
        let next = if all_have {
            current.difference(flag)
        } else if current.contains(flag) {
            current
        } else {
            current.toggled(*format)
        };
        if next != current {
            Mutation::SetTextFormat { key, format: next }.apply(tx)?;
        }
    }
    Ok(true)
}

fn format_element(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let Command::FormatElement { format } = command else {
        return Ok(false);
    };
    let Some(selection) = tx.selection().cloned() else {
        return Ok(false);
    };

    let mut blocks: Vec<NodeKey> = Vec::new();
    for key in tx.keys_between(selection.anchor_key(), selection.focus_key()) {
        if let Some(block) = tx.enclosing_block(&key) {
            let formattable = tx.data(&block).and_then(NodeData::element_format).is_some();
            if formattable && !blocks.contains(&block) {
                blocks.push(block);
            }
        }
    }
    if blocks.is_empty() {
        return Ok(false);
    }

    for key in blocks {
        Mutation::SetElementFormat { key, format: *format }.apply(tx)?;
    }
    Ok(true)
}

/// Recolor the outermost layout container around the anchor, or the first
/// top-level one when nothing is selected
fn set_template_background(
    command: &Command,
    tx: &mut Transaction<'_>,
    _ctx: &mut CommandContext<'_>,
) -> EditorResult<bool> {
    let Command::SetTemplateBackground { color } = command else {
        return Ok(false);
    };
    if !is_hex_color(color) {
        debug!(color = %color, "Rejected background color");
        return Ok(false);
    }

    let Some(key) = target_layout_container(tx) else {
        return Ok(false);
    };
    Mutation::SetBackgroundColor {
        key,
        color: color.clone(),
    }
    .apply(tx)?;
    Ok(true)
}

/// Outermost layout container enclosing the anchor, falling back to the
/// first top-level layout container
pub(crate) fn target_layout_container(source: &dyn NodeSource) -> Option<NodeKey> {
    let is_container = |key: &NodeKey| matches!(source.data(key), Some(NodeData::LayoutContainer(_)));

    let from_anchor = source.selection_anchor().and_then(|anchor| {
        std::iter::once(anchor.clone())
            .chain(source.ancestors(&anchor))
            .filter(|key| is_container(key))
            .last()
    });

    from_anchor.or_else(|| source.top_level_keys().iter().find(|key| is_container(*key)).cloned())
}

fn update_image(command: &Command, tx: &mut Transaction<'_>, _ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let mutation = match command {
        Command::ReplaceImage { key, src } => Mutation::SetImageSource {
            key: key.clone(),
            src: src.clone(),
            alt_text: None,
            width: Some(IMAGE_MENU_WIDTH),
            height: Some(IMAGE_MENU_HEIGHT),
        },
        Command::ResetImage { key } => Mutation::SetImageSource {
            key: key.clone(),
            src: IMAGE_PLACEHOLDER_SRC.to_string(),
            alt_text: Some(IMAGE_PLACEHOLDER_ALT.to_string()),
            width: Some(IMAGE_MENU_WIDTH),
            height: Some(IMAGE_MENU_HEIGHT),
        },
        _ => return Ok(false),
    };
    let is_image = mutation
        .target()
        .and_then(|key| tx.data(key))
        .map_or(false, |data| matches!(data, NodeData::Image(_)));
    if !is_image {
        return Ok(false);
    }
    mutation.apply(tx)?;
    Ok(true)
}

/// Export the last committed snapshot and hand it to the sink
fn export(_command: &Command, tx: &mut Transaction<'_>, ctx: &mut CommandContext<'_>) -> EditorResult<bool> {
    let payload = export_payload(tx.base(), tx.registry(), &ctx.config.export)?;
    ctx.sink.deliver(payload);
    Ok(true)
}

/// Insert blocks one after another at the nearest root of the anchor, or at
/// the end of the document without a selection.
///
/// A block decorator left as the last child gets an empty paragraph after it.
/// The caret moves to the start of whatever follows the inserted blocks.
fn insert_blocks_at_nearest_root(tx: &mut Transaction<'_>, trees: &[NodeTree]) -> EditorResult<Vec<NodeKey>> {
    let target = tx
        .selection()
        .map(|selection| selection.anchor_key().clone())
        .filter(|anchor| !anchor.is_root())
        .and_then(|anchor| tx.nearest_root_block(&anchor));

    let (parent, mut index) = match target {
        Some(block) => {
            let parent = tx.parent_of(&block).cloned().unwrap_or_else(NodeKey::root);
            let index = tx
                .children_of(&parent)
                .iter()
                .position(|key| *key == block)
                .map_or(0, |i| i + 1);
            (parent, index)
        }
        None => {
            let root = NodeKey::root();
            let index = tx.children_of(&root).len();
            (root, index)
        }
    };

    let mut inserted = Vec::with_capacity(trees.len());
    for tree in trees {
        inserted.push(tx.insert_tree(&parent, index, tree)?);
        index += 1;
    }

    let Some(last) = inserted.last() else {
        return Ok(inserted);
    };
    let next = tx.children_of(&parent).get(index).cloned();
    match next {
        Some(next) => tx.set_selection(Some(Selection::caret(next, 0))),
        None => {
            let is_block_decorator = tx.data(last).map_or(false, NodeData::is_block_decorator);
            if is_block_decorator {
                let paragraph = tx.append_tree(&parent, &NodeTree::new(NodeData::paragraph()))?;
                tx.set_selection(Some(Selection::caret(paragraph, 0)));
            }
        }
    }
    Ok(inserted)
}
