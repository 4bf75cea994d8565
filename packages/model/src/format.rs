use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Inline formatting carried by text nodes, serialized as its bit value
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextFormat: u32 {
        const BOLD = 1;
        const ITALIC = 1 << 1;
        const STRIKETHROUGH = 1 << 2;
        const UNDERLINE = 1 << 3;
        const CODE = 1 << 4;
        const SUBSCRIPT = 1 << 5;
        const SUPERSCRIPT = 1 << 6;
        const HIGHLIGHT = 1 << 7;
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat::empty()
    }
}

impl Serialize for TextFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for TextFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u32::deserialize(deserializer)?;
        Ok(TextFormat::from_bits_retain(bits))
    }
}

/// Named text format, as toggled by toolbar buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormatType {
    Bold,
    Italic,
    Strikethrough,
    Underline,
    Code,
    Subscript,
    Superscript,
    Highlight,
}

impl TextFormatType {
    pub fn flag(self) -> TextFormat {
        match self {
            TextFormatType::Bold => TextFormat::BOLD,
            TextFormatType::Italic => TextFormat::ITALIC,
            TextFormatType::Strikethrough => TextFormat::STRIKETHROUGH,
            TextFormatType::Underline => TextFormat::UNDERLINE,
            TextFormatType::Code => TextFormat::CODE,
            TextFormatType::Subscript => TextFormat::SUBSCRIPT,
            TextFormatType::Superscript => TextFormat::SUPERSCRIPT,
            TextFormatType::Highlight => TextFormat::HIGHLIGHT,
        }
    }
}

impl TextFormat {
    /// Toggle one format. Subscript and superscript exclude each other.
    pub fn toggled(self, format: TextFormatType) -> Self {
        let flag = format.flag();
        let mut next = self ^ flag;
        if next.contains(flag) {
            match format {
                TextFormatType::Subscript => next.remove(TextFormat::SUPERSCRIPT),
                TextFormatType::Superscript => next.remove(TextFormat::SUBSCRIPT),
                _ => {}
            }
        }
        next
    }
}

/// Block alignment of element nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementFormat {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "start")]
    Start,
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "end")]
    End,
    #[serde(rename = "justify")]
    Justify,
}

impl ElementFormat {
    /// CSS `text-align` value, `None` when unset
    pub fn as_css(self) -> Option<&'static str> {
        match self {
            ElementFormat::Unset => None,
            ElementFormat::Left => Some("left"),
            ElementFormat::Start => Some("start"),
            ElementFormat::Center => Some("center"),
            ElementFormat::Right => Some("right"),
            ElementFormat::End => Some("end"),
            ElementFormat::Justify => Some("justify"),
        }
    }

    pub fn from_css(value: &str) -> Self {
        match value.trim() {
            "left" => ElementFormat::Left,
            "start" => ElementFormat::Start,
            "center" => ElementFormat::Center,
            "right" => ElementFormat::Right,
            "end" => ElementFormat::End,
            "justify" => ElementFormat::Justify,
            _ => ElementFormat::Unset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_format_serializes_as_bits() {
        let format = TextFormat::BOLD | TextFormat::ITALIC;
        assert_eq!(serde_json::to_string(&format).unwrap(), "3");

        let parsed: TextFormat = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, TextFormat::BOLD | TextFormat::UNDERLINE);
    }

    #[test]
    fn test_unknown_bits_are_kept() {
        let parsed: TextFormat = serde_json::from_str("257").unwrap();
        assert!(parsed.contains(TextFormat::BOLD));
        assert_eq!(parsed.bits(), 257);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "257");

        let toggled = parsed.toggled(TextFormatType::Bold);
        assert_eq!(toggled.bits(), 256);
    }

    #[test]
    fn test_subscript_excludes_superscript() {
        let format = TextFormat::SUPERSCRIPT.toggled(TextFormatType::Subscript);
        assert_eq!(format, TextFormat::SUBSCRIPT);

        let cleared = format.toggled(TextFormatType::Subscript);
        assert!(cleared.is_empty());
    }

    #[test]
    fn test_element_format_empty_string() {
        let unset: ElementFormat = serde_json::from_str("\"\"").unwrap();
        assert_eq!(unset, ElementFormat::Unset);
        assert_eq!(serde_json::to_string(&ElementFormat::Center).unwrap(), "\"center\"");
    }
}
