use folio_model::{ExternalElement, ExternalNode};
use thiserror::Error;

/// Errors that can occur while rendering or parsing HTML
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Invalid tag name: {0}")]
    InvalidTag(String),

    #[error("Compilation error: {0}")]
    Generic(String),
}

impl From<String> for CompileError {
    fn from(s: String) -> Self {
        CompileError::Generic(s)
    }
}

impl From<&str> for CompileError {
    fn from(s: &str) -> Self {
        CompileError::Generic(s.to_string())
    }
}

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Put block elements on their own indented lines
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

struct Context {
    options: CompileOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: CompileOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Render exported document content to an HTML string
pub fn compile_to_html(nodes: &[ExternalNode], options: CompileOptions) -> Result<String, CompileError> {
    let mut ctx = Context::new(options);

    for node in nodes {
        compile_block(node, &mut ctx)?;
    }

    Ok(ctx.get_output())
}

/// A node on its own line in pretty mode
fn compile_block(node: &ExternalNode, ctx: &mut Context) -> Result<(), CompileError> {
    if ctx.options.pretty {
        ctx.add_indent();
    }
    compile_node(node, ctx)?;
    ctx.newline();
    Ok(())
}

fn compile_node(node: &ExternalNode, ctx: &mut Context) -> Result<(), CompileError> {
    match node {
        ExternalNode::Text { content } => {
            ctx.add(&escape_html(content));
            Ok(())
        }
        ExternalNode::Element(element) => compile_element(element, ctx),
    }
}

fn compile_element(element: &ExternalElement, ctx: &mut Context) -> Result<(), CompileError> {
    let name = element.tag.as_str();
    if !is_valid_tag_name(name) {
        return Err(CompileError::InvalidTag(name.to_string()));
    }

    ctx.add(&format!("<{}", name));

    for (attr_name, value) in &element.attributes {
        if attr_name == "style" {
            continue;
        }
        ctx.add(&format!(" {}=\"{}\"", attr_name, escape_html(value)));
    }

    if let Some(style) = element.style_attribute() {
        ctx.add(&format!(" style=\"{}\"", escape_html(&style)));
    }

    ctx.add(">");

    if is_void_element(name) {
        return Ok(());
    }

    if ctx.options.pretty && has_block_children(element) {
        ctx.add("\n");
        ctx.indent();
        for child in &element.children {
            compile_block(child, ctx)?;
        }
        ctx.dedent();
        ctx.add_indent();
    } else {
        for child in &element.children {
            compile_node(child, ctx)?;
        }
    }

    ctx.add(&format!("</{}>", name));

    Ok(())
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Elements rendered without a closing tag
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_valid_tag_name(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Children that get their own lines when pretty printing
fn has_block_children(element: &ExternalElement) -> bool {
    element.children.iter().any(|child| {
        matches!(
            child,
            ExternalNode::Element(e) if matches!(
                e.tag.as_str(),
                "div" | "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "figure" | "hr" | "iframe"
            )
        )
    })
}
