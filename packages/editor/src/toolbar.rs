//! Display state derived from a snapshot for toolbar-style widgets.
//!
//! Widgets subscribe to the editor and rebuild these on every update event.

use crate::commands::handlers::target_layout_container;
use crate::state::NodeSource;
use folio_model::nodes::layout::DEFAULT_BACKGROUND_COLOR;
use folio_model::{ElementFormat, NodeData, NodeKey, TextFormat};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolbarState {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
    /// `paragraph`, `h1`..`h6`, `layout-item`, ...
    pub block_type: Option<String>,
    pub element_format: ElementFormat,
}

impl ToolbarState {
    pub fn derive(source: &dyn NodeSource) -> Self {
        let Some(anchor) = source.selection_anchor() else {
            return Self::default();
        };

        let format = source
            .data(&anchor)
            .and_then(NodeData::text_format)
            .unwrap_or_default();
        let block = source.enclosing_block(&anchor);
        let block_data = block.as_ref().and_then(|key| source.data(key));

        Self {
            bold: format.contains(TextFormat::BOLD),
            italic: format.contains(TextFormat::ITALIC),
            underline: format.contains(TextFormat::UNDERLINE),
            strikethrough: format.contains(TextFormat::STRIKETHROUGH),
            code: format.contains(TextFormat::CODE),
            block_type: block_data.map(|data| match data {
                NodeData::Heading(heading) => heading.tag.as_str().to_string(),
                other => other.type_tag().to_string(),
            }),
            element_format: block_data
                .and_then(NodeData::element_format)
                .unwrap_or_default(),
        }
    }
}

/// State of the template background picker
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundColorState {
    /// Layout container the picker would recolor
    pub target: Option<NodeKey>,
    pub color: String,
}

impl BackgroundColorState {
    pub fn derive(source: &dyn NodeSource) -> Self {
        let target = target_layout_container(source);
        let color = target
            .as_ref()
            .and_then(|key| match source.data(key) {
                Some(NodeData::LayoutContainer(container)) => Some(container.background_color.clone()),
                _ => None,
            })
            .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());
        Self { target, color }
    }

    /// Whether the picker has anything to act on
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}
