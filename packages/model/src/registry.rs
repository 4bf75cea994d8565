//! Node Type Registry: how each node type serializes, exports and imports.

use crate::error::{ModelError, ModelResult};
use crate::external::ExternalNode;
use crate::import::{import_external, Recognizer, RecognizerLookup};
use crate::node::{NodeData, NodeTree};
use crate::nodes::{decorator, element, embed, image, layout, text};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub type SerializeFn = fn(&NodeData) -> ModelResult<Map<String, Value>>;
pub type DeserializeFn = fn(&Value) -> ModelResult<NodeData>;
/// Builds the external form of a node from its already exported children
pub type ExportFn = fn(&NodeData, Vec<ExternalNode>) -> ModelResult<ExternalNode>;

#[derive(Clone)]
pub struct NodeTypeEntry {
    pub node_type: &'static str,
    pub version: u32,
    pub serialize: SerializeFn,
    pub deserialize: DeserializeFn,
    /// `None` for nodes that export only their children (the root)
    pub export: Option<ExportFn>,
    /// Recognizers keyed by the lowercase tag they inspect
    pub importers: Vec<(&'static str, Recognizer)>,
}

impl NodeTypeEntry {
    pub fn new(
        node_type: &'static str,
        version: u32,
        serialize: SerializeFn,
        deserialize: DeserializeFn,
    ) -> Self {
        Self {
            node_type,
            version,
            serialize,
            deserialize,
            export: None,
            importers: Vec::new(),
        }
    }

    pub fn with_export(mut self, export: ExportFn) -> Self {
        self.export = Some(export);
        self
    }

    pub fn with_importer(mut self, tag: &'static str, recognizer: Recognizer) -> Self {
        self.importers.push((tag, recognizer));
        self
    }
}

impl std::fmt::Debug for NodeTypeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTypeEntry")
            .field("node_type", &self.node_type)
            .field("version", &self.version)
            .field("importers", &self.importers.len())
            .finish()
    }
}

/// Post-processing applied to the exported form of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOverride {
    /// Remove `style` and `class` from the element and its descendants
    StripPresentational,
}

#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    entries: BTreeMap<&'static str, NodeTypeEntry>,
    overrides: BTreeMap<&'static str, ExportOverride>,
}

impl NodeRegistry {
    /// Registry without any node types
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in node type and the default export overrides
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(NodeTypeEntry::new(
            element::root::TYPE,
            element::VERSION,
            element::root::serialize,
            element::root::deserialize,
        ));
        registry.register(
            NodeTypeEntry::new(
                element::paragraph::TYPE,
                element::VERSION,
                element::paragraph::serialize,
                element::paragraph::deserialize,
            )
            .with_export(element::paragraph::export)
            .with_importer("p", element::paragraph::import),
        );

        let mut heading = NodeTypeEntry::new(
            element::heading::TYPE,
            element::VERSION,
            element::heading::serialize,
            element::heading::deserialize,
        )
        .with_export(element::heading::export);
        for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            heading = heading.with_importer(tag, element::heading::import);
        }
        registry.register(heading);

        registry.register(
            NodeTypeEntry::new(
                layout::container::TYPE,
                layout::VERSION,
                layout::container::serialize,
                layout::container::deserialize,
            )
            .with_export(layout::container::export)
            .with_importer("div", layout::container::import),
        );
        registry.register(
            NodeTypeEntry::new(
                layout::item::TYPE,
                layout::VERSION,
                layout::item::serialize,
                layout::item::deserialize,
            )
            .with_export(layout::item::export)
            .with_importer("div", layout::item::import),
        );

        let mut text_entry =
            NodeTypeEntry::new(text::TYPE, text::VERSION, text::serialize, text::deserialize)
                .with_export(text::export);
        for tag in text::FORMAT_TAGS.iter().copied() {
            text_entry = text_entry.with_importer(tag, text::import);
        }
        registry.register(text_entry);

        registry.register(
            NodeTypeEntry::new(
                text::linebreak::TYPE,
                text::VERSION,
                text::linebreak::serialize,
                text::linebreak::deserialize,
            )
            .with_export(text::linebreak::export)
            .with_importer("br", text::linebreak::import),
        );
        registry.register(
            NodeTypeEntry::new(image::TYPE, image::VERSION, image::serialize, image::deserialize)
                .with_export(image::export)
                .with_importer("img", image::import),
        );
        registry.register(
            NodeTypeEntry::new(
                decorator::horizontal_rule::TYPE,
                decorator::VERSION,
                decorator::horizontal_rule::serialize,
                decorator::horizontal_rule::deserialize,
            )
            .with_export(decorator::horizontal_rule::export)
            .with_importer("hr", decorator::horizontal_rule::import),
        );
        registry.register(
            NodeTypeEntry::new(
                decorator::page_break::TYPE,
                decorator::VERSION,
                decorator::page_break::serialize,
                decorator::page_break::deserialize,
            )
            .with_export(decorator::page_break::export)
            .with_importer("figure", decorator::page_break::import),
        );
        registry.register(
            NodeTypeEntry::new(
                decorator::template::TYPE,
                decorator::VERSION,
                decorator::template::serialize,
                decorator::template::deserialize,
            )
            .with_export(decorator::template::export)
            .with_importer("div", decorator::template::import),
        );
        registry.register(
            NodeTypeEntry::new(
                embed::tweet::TYPE,
                embed::VERSION,
                embed::tweet::serialize,
                embed::tweet::deserialize,
            )
            .with_export(embed::tweet::export)
            .with_importer("div", embed::tweet::import),
        );
        registry.register(
            NodeTypeEntry::new(
                embed::youtube::TYPE,
                embed::VERSION,
                embed::youtube::serialize,
                embed::youtube::deserialize,
            )
            .with_export(embed::youtube::export)
            .with_importer("iframe", embed::youtube::import),
        );

        registry.set_export_override(element::paragraph::TYPE, ExportOverride::StripPresentational);
        registry.set_export_override(text::TYPE, ExportOverride::StripPresentational);

        registry
    }

    /// Register a node type, replacing any entry with the same tag
    pub fn register(&mut self, entry: NodeTypeEntry) {
        self.entries.insert(entry.node_type, entry);
    }

    pub fn set_export_override(&mut self, node_type: &'static str, export_override: ExportOverride) {
        self.overrides.insert(node_type, export_override);
    }

    pub fn clear_export_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn export_override(&self, node_type: &str) -> Option<ExportOverride> {
        self.overrides.get(node_type).copied()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    pub fn node_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn entry(&self, node_type: &str) -> ModelResult<&NodeTypeEntry> {
        self.entries
            .get(node_type)
            .ok_or_else(|| ModelError::UnknownNodeType(node_type.to_string()))
    }

    /// `{type, version, ...fields}` for one node, without children
    pub fn serialize_node(&self, data: &NodeData) -> ModelResult<Map<String, Value>> {
        let entry = self.entry(data.type_tag())?;
        (entry.serialize)(data)
    }

    pub fn deserialize_node(&self, value: &Value) -> ModelResult<NodeData> {
        let node_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ModelError::MissingType)?;
        let entry = self.entry(node_type)?;
        (entry.deserialize)(value)
    }

    /// Serialize a detached tree; element nodes always carry `children`
    pub fn serialize_tree(&self, tree: &NodeTree) -> ModelResult<Value> {
        let mut map = self.serialize_node(&tree.data)?;
        if tree.data.is_element() {
            let children = tree
                .children
                .iter()
                .map(|child| self.serialize_tree(child))
                .collect::<ModelResult<Vec<_>>>()?;
            map.insert("children".to_string(), Value::Array(children));
        }
        Ok(Value::Object(map))
    }

    /// Deserialize a JSON node and all of its descendants
    pub fn deserialize_tree(&self, value: &Value) -> ModelResult<NodeTree> {
        let data = self.deserialize_node(value)?;
        let mut tree = NodeTree::new(data);
        if !tree.data.is_element() {
            return Ok(tree);
        }
        match value.get("children") {
            None | Some(Value::Null) => {}
            Some(Value::Array(children)) => {
                for child in children {
                    tree.children.push(self.deserialize_tree(child)?);
                }
            }
            Some(_) => {
                return Err(ModelError::invalid_field(
                    tree.data.type_tag(),
                    "children",
                    "expected an array",
                ))
            }
        }
        Ok(tree)
    }

    /// Export one node given its exported children, applying any override
    pub fn export_node(
        &self,
        data: &NodeData,
        children: Vec<ExternalNode>,
    ) -> ModelResult<Vec<ExternalNode>> {
        let entry = self.entry(data.type_tag())?;
        let Some(export) = entry.export else {
            return Ok(children);
        };
        let mut node = export(data, children)?;
        if let Some(ExportOverride::StripPresentational) = self.export_override(entry.node_type) {
            node.strip_presentational();
        }
        Ok(vec![node])
    }

    /// Export a detached tree. The root contributes only its children.
    pub fn export_tree(&self, tree: &NodeTree) -> ModelResult<Vec<ExternalNode>> {
        let mut children = Vec::new();
        for child in &tree.children {
            children.extend(self.export_tree(child)?);
        }
        self.export_node(&tree.data, children)
    }

    /// Convert pasted external content into detached trees
    pub fn import_external(&self, nodes: &[ExternalNode]) -> Vec<NodeTree> {
        import_external(self, nodes)
    }
}

impl RecognizerLookup for NodeRegistry {
    fn recognizers(&self, tag: &str) -> Vec<Recognizer> {
        self.entries
            .values()
            .flat_map(|entry| entry.importers.iter())
            .filter(|(importer_tag, _)| *importer_tag == tag)
            .map(|(_, recognizer)| *recognizer)
            .collect()
    }
}
