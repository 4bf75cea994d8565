//! HTML fragment parsing into the external representation.
//!
//! Lenient in the way browsers are: unclosed elements are closed at the end
//! of their parent, `<script>`/`<style>` content is dropped and a closing tag
//! with no open element of that name is ignored.

use crate::compiler::{is_void_element, CompileError};
use crate::lexer::{tokenize, HtmlToken};
use folio_model::style::parse_style_attribute;
use folio_model::{ExternalElement, ExternalNode};

/// Elements whose content never reaches the document
fn is_discarded(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "head" | "title" | "template")
}

/// Parse an HTML fragment
pub fn parse_fragment(source: &str) -> Result<Vec<ExternalNode>, CompileError> {
    let mut roots: Vec<ExternalNode> = Vec::new();
    let mut stack: Vec<ExternalElement> = Vec::new();

    for token in tokenize(source) {
        match token {
            HtmlToken::Text(text) => {
                push_text(&mut stack, &mut roots, &decode_entities(text));
            }
            HtmlToken::OpenTag(raw) => {
                let (element, self_closing) = parse_open_tag(raw)?;
                if self_closing || is_void_element(&element.tag) {
                    attach(&mut stack, &mut roots, element);
                } else {
                    stack.push(element);
                }
            }
            HtmlToken::CloseTag(name) => {
                let name = name.to_ascii_lowercase();
                if is_void_element(&name) {
                    continue;
                }
                let Some(position) = stack.iter().rposition(|open| open.tag == name) else {
                    continue;
                };
                while stack.len() > position {
                    close_top(&mut stack, &mut roots);
                }
            }
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut roots);
    }

    Ok(roots)
}

fn close_top(stack: &mut Vec<ExternalElement>, roots: &mut Vec<ExternalNode>) {
    if let Some(element) = stack.pop() {
        if !is_discarded(&element.tag) {
            attach(stack, roots, element);
        }
    }
}

fn attach(stack: &mut [ExternalElement], roots: &mut Vec<ExternalNode>, element: ExternalElement) {
    let node = ExternalNode::Element(element);
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn push_text(stack: &mut [ExternalElement], roots: &mut Vec<ExternalNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    // Adjacent text (split by a stray `<`) merges into one node
    if let Some(ExternalNode::Text { content }) = siblings.last_mut() {
        content.push_str(text);
    } else {
        siblings.push(ExternalNode::text(text));
    }
}

/// Split `<tag attr="v" ...>` into an element and whether it self-closes
fn parse_open_tag(raw: &str) -> Result<(ExternalElement, bool), CompileError> {
    let inner = &raw[1..raw.len() - 1];
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let tag = inner[..name_end].to_ascii_lowercase();
    if tag.is_empty() {
        return Err(CompileError::InvalidTag(raw.to_string()));
    }

    let mut element = ExternalElement::new(tag);
    for (name, value) in parse_attributes(&inner[name_end..]) {
        if name == "style" {
            element.styles = parse_style_attribute(&value);
        } else {
            element.attributes.insert(name, value);
        }
    }

    Ok((element, self_closing))
}

fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let chars: Vec<char> = source.chars().collect();
    let mut attributes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        let name_start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' && chars[i] != '/' {
            i += 1;
        }
        if name_start == i {
            break;
        }
        let name: String = chars[name_start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() || chars[i] != '=' {
            attributes.push((name, String::new()));
            continue;
        }
        i += 1;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        let value: String = match chars.get(i) {
            Some(&quote) if quote == '"' || quote == '\'' => {
                i += 1;
                let value_start = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                let value = chars[value_start..i].iter().collect();
                i += 1;
                value
            }
            _ => {
                let value_start = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[value_start..i].iter().collect()
            }
        };
        attributes.push((name, decode_entities(&value)));
    }

    attributes
}

/// Decode the character references that pasted markup commonly contains
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
