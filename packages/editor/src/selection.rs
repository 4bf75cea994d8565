use folio_model::NodeKey;
use serde::{Deserialize, Serialize};

/// Position inside a node: a character offset for text, a child index for
/// elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub key: NodeKey,
    pub offset: usize,
}

impl Point {
    pub fn new(key: NodeKey, offset: usize) -> Self {
        Self { key, offset }
    }
}

/// Stored selection. Cursor math is left to the host; the editor only keeps
/// the endpoints and drops them when their nodes go away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Selection {
    Range { anchor: Point, focus: Point },
    Node { key: NodeKey },
}

impl Selection {
    /// Collapsed range selection
    pub fn caret(key: NodeKey, offset: usize) -> Self {
        Selection::Range {
            anchor: Point::new(key.clone(), offset),
            focus: Point::new(key, offset),
        }
    }

    pub fn range(anchor: Point, focus: Point) -> Self {
        Selection::Range { anchor, focus }
    }

    pub fn node(key: NodeKey) -> Self {
        Selection::Node { key }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Selection::Range { .. })
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Range { anchor, focus } => anchor == focus,
            Selection::Node { .. } => false,
        }
    }

    pub fn anchor_key(&self) -> &NodeKey {
        match self {
            Selection::Range { anchor, .. } => &anchor.key,
            Selection::Node { key } => key,
        }
    }

    pub fn focus_key(&self) -> &NodeKey {
        match self {
            Selection::Range { focus, .. } => &focus.key,
            Selection::Node { key } => key,
        }
    }

    /// Every node key the selection refers to
    pub fn keys(&self) -> Vec<&NodeKey> {
        match self {
            Selection::Range { anchor, focus } => vec![&anchor.key, &focus.key],
            Selection::Node { key } => vec![key],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_is_collapsed() {
        let caret = Selection::caret(NodeKey::new("a"), 2);
        assert!(caret.is_range());
        assert!(caret.is_collapsed());
        assert_eq!(caret.anchor_key(), caret.focus_key());
    }

    #[test]
    fn test_selection_serialization() {
        let selection = Selection::node(NodeKey::new("img"));
        let json = serde_json::to_string(&selection).unwrap();
        assert_eq!(json, r#"{"type":"node","key":"img"}"#);
    }
}
