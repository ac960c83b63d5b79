use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Character used for atomic nodes in the plain-text projection so that
/// character indices stay aligned with document units.
pub const ATOM_PLACEHOLDER: char = '\u{FFFC}';

/// Attributes of an inline context-item node.
///
/// `kind` selects the renderer in the registry ("file", "number", "select",
/// "date", ...); `metadata` is an open bag interpreted by that renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextItemAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

fn default_kind() -> String {
    "file".to_string()
}

fn default_label() -> String {
    "Context Item".to_string()
}

impl Default for ContextItemAttrs {
    fn default() -> Self {
        Self {
            id: None,
            kind: default_kind(),
            label: default_label(),
            metadata: Map::new(),
        }
    }
}

/// One inline node of the document. The serialized form follows the
/// conventional rich-content JSON shape (`{"type": "text", ...}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InlineNode {
    Text { text: String },
    HardBreak,
    ContextItem { attrs: ContextItemAttrs },
}

impl InlineNode {
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text { text: text.into() }
    }

    pub fn context_item(attrs: ContextItemAttrs) -> Self {
        InlineNode::ContextItem { attrs }
    }

    /// Length of this node in units.
    pub fn units(&self) -> usize {
        match self {
            InlineNode::Text { text } => text.chars().count(),
            InlineNode::HardBreak | InlineNode::ContextItem { .. } => 1,
        }
    }
}

/// A flat inline document: the unit of content exchanged with the engine.
///
/// Serializes as `{"type": "doc", "content": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocRepr", into = "DocRepr")]
pub struct Document {
    pub content: Vec<InlineNode>,
}

#[derive(Serialize, Deserialize)]
struct DocRepr {
    #[serde(rename = "type")]
    tag: DocTag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<InlineNode>,
}

#[derive(Serialize, Deserialize)]
enum DocTag {
    #[serde(rename = "doc")]
    Doc,
}

impl From<DocRepr> for Document {
    fn from(repr: DocRepr) -> Self {
        Document {
            content: repr.content,
        }
    }
}

impl From<Document> for DocRepr {
    fn from(doc: Document) -> Self {
        DocRepr {
            tag: DocTag::Doc,
            content: doc.content,
        }
    }
}

impl Document {
    pub fn new(content: Vec<InlineNode>) -> Self {
        Self { content }
    }

    /// Build a document holding a single text node. An empty string yields
    /// an empty document.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            Self::default()
        } else {
            Self::new(vec![InlineNode::text(text)])
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.iter().all(|node| match node {
            InlineNode::Text { text } => text.is_empty(),
            _ => false,
        })
    }

    pub fn len_units(&self) -> usize {
        self.content.iter().map(InlineNode::units).sum()
    }

    /// Plain-text projection aligned with unit positions: text characters
    /// verbatim, hard breaks as `\n`, atoms as [`ATOM_PLACEHOLDER`].
    pub fn to_plain_text(&self) -> String {
        let mut out = String::with_capacity(self.len_units());
        for node in &self.content {
            match node {
                InlineNode::Text { text } => out.push_str(text),
                InlineNode::HardBreak => out.push('\n'),
                InlineNode::ContextItem { .. } => out.push(ATOM_PLACEHOLDER),
            }
        }
        out
    }
}

/// Rich content as accepted by insertion APIs and shortcut templates:
/// either a full `doc` wrapper, a single node, or a bare node list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichContent {
    Doc(Document),
    Node(InlineNode),
    Nodes(Vec<InlineNode>),
}

impl RichContent {
    /// Flatten to the node list that actually gets inserted. A `doc`
    /// wrapper contributes only its inner content, never itself.
    pub fn into_nodes(self) -> Vec<InlineNode> {
        match self {
            RichContent::Doc(doc) => doc.content,
            RichContent::Node(node) => vec![node],
            RichContent::Nodes(nodes) => nodes,
        }
    }
}
