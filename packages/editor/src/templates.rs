//! Built-in document templates.

use folio_model::{HeadingTag, Image, NodeData, NodeTree, TextFormat, TextNode};

pub const CONTACT_SUPPORT: &str = "contact-support";

const CONTACT_IMAGE_URLS: [&str; 4] = [
    "https://images.unsplash.com/photo-1511367461989-f85a21fda167?w=300&h=120&fit=crop&crop=faces",
    "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=300&h=120&fit=crop&crop=faces",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=300&h=120&fit=crop&crop=faces",
    "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=300&h=120&fit=crop&crop=faces",
];
const CONTACT_IMAGE_WIDTH: u32 = 300;
const CONTACT_IMAGE_HEIGHT: u32 = 120;

/// Template tree for a registered id
pub fn template_tree(template_id: &str) -> Option<NodeTree> {
    match template_id {
        CONTACT_SUPPORT => Some(contact_support()),
        _ => None,
    }
}

/// Ids accepted by [`template_tree`]
pub fn template_ids() -> &'static [&'static str] {
    &[CONTACT_SUPPORT]
}

/// Two columns (`1fr 3fr`): a title and description on the left, a row of
/// four captioned images on the right
pub fn contact_support() -> NodeTree {
    let title = NodeTree::new(NodeData::heading(HeadingTag::H1)).with_child(NodeTree::new(NodeData::Text(
        TextNode::new("Title").with_format(TextFormat::BOLD),
    )));
    let description = NodeTree::paragraph_with_text(
        "Description: Add your description text here. You can edit this text directly in the editor.",
    );
    let left = NodeTree::new(NodeData::layout_item()).with_children([title, description]);

    let cells = CONTACT_IMAGE_URLS.iter().enumerate().map(|(i, src)| {
        let label = format!("test {}", i + 1);
        let image = Image::new(*src, label.clone())
            .with_size(CONTACT_IMAGE_WIDTH, CONTACT_IMAGE_HEIGHT)
            .with_max_width(CONTACT_IMAGE_WIDTH);
        NodeTree::new(NodeData::layout_item())
            .with_child(NodeTree::new(NodeData::Image(image)))
            .with_child(NodeTree::paragraph_with_text(label))
    });
    let image_grid = NodeTree::new(NodeData::layout_container("1fr 1fr 1fr 1fr")).with_children(cells);
    let right = NodeTree::new(NodeData::layout_item()).with_child(image_grid);

    NodeTree::new(NodeData::layout_container("1fr 3fr")).with_children([left, right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_support_shape() {
        let tree = contact_support();
        match &tree.data {
            NodeData::LayoutContainer(container) => assert_eq!(container.template_columns, "1fr 3fr"),
            other => panic!("expected a layout container, got {:?}", other),
        }
        assert_eq!(tree.children.len(), 2);

        let grid = &tree.children[1].children[0];
        assert_eq!(grid.children.len(), 4);
        for cell in &grid.children {
            assert!(matches!(cell.children[0].data, NodeData::Image(_)));
            assert!(matches!(cell.children[1].data, NodeData::Paragraph(_)));
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(template_tree("newsletter").is_none());
        assert!(template_tree(CONTACT_SUPPORT).is_some());
    }
}
