//! Inline CSS handling for content pasted from outside the editor.

use crate::external::ExternalElement;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_FONT_SIZE: &str = "15px";
pub const DEFAULT_TEXT_COLOR: &str = "rgb(0, 0, 0)";
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgb(255, 255, 255)";

pub const MIN_ALLOWED_FONT_SIZE: f64 = 8.0;
pub const MAX_ALLOWED_FONT_SIZE: f64 = 72.0;

fn font_size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+(?:\.\d+)?)px$").expect("font size pattern"))
}

fn rgb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$").expect("rgb pattern")
    })
}

fn hex_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex pattern"))
}

/// Split a `style` attribute into lowercase property / value pairs
pub fn parse_style_attribute(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect()
}

/// Accept `<n>px` font sizes within the allowed range
pub fn parse_allowed_font_size(value: &str) -> Option<String> {
    let value = value.trim();
    let captures = font_size_re().captures(value)?;
    let size: f64 = captures[1].parse().ok()?;
    if (MIN_ALLOWED_FONT_SIZE..=MAX_ALLOWED_FONT_SIZE).contains(&size) {
        Some(value.to_string())
    } else {
        None
    }
}

/// Accept `rgb(r, g, b)` or hex colors, normalized to `rgb(r, g, b)`
pub fn parse_allowed_color(value: &str) -> Option<String> {
    let value = value.trim();

    if let Some(captures) = rgb_re().captures(value) {
        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            *channel = captures[i + 1].parse().ok()?;
        }
        return Some(format_rgb(channels));
    }

    let captures = hex_re().captures(value)?;
    let hex = &captures[1];
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    let mut channels = [0u8; 3];
    for (i, channel) in channels.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(format_rgb(channels))
}

/// Six-digit `#rrggbb` color, as accepted for template backgrounds
pub fn is_hex_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn format_rgb([r, g, b]: [u8; 3]) -> String {
    format!("rgb({}, {}, {})", r, g, b)
}

/// Styles on a pasted element worth keeping on its text.
///
/// Only values that differ from the editor defaults are returned, so pasted
/// content that merely restates the defaults stays unstyled.
pub fn extra_styles(element: &ExternalElement) -> String {
    let mut extra = String::new();

    if let Some(size) = element.style("font-size").and_then(parse_allowed_font_size) {
        if size != DEFAULT_FONT_SIZE {
            extra.push_str(&format!("font-size: {};", size));
        }
    }
    if let Some(background) = element
        .style("background-color")
        .and_then(parse_allowed_color)
    {
        if background != DEFAULT_BACKGROUND_COLOR {
            extra.push_str(&format!("background-color: {};", background));
        }
    }
    if let Some(color) = element.style("color").and_then(parse_allowed_color) {
        if color != DEFAULT_TEXT_COLOR {
            extra.push_str(&format!("color: {};", color));
        }
    }

    extra
}
