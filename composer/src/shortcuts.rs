//! Slash-command shortcut definitions.
//!
//! A [`PromptShortcut`] is a static template of rich content inserted when
//! the user picks it from the `/` popup. Templates are either literal
//! fragments or zero/one-argument generators; a template carrying a full
//! `doc` wrapper contributes only its inner nodes on insertion.

use promptline_engine::ContextItemAttrs;
use promptline_engine::Document;
use promptline_engine::InlineNode;
use promptline_engine::RichContent;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

/// Content template of a shortcut.
#[derive(Clone, Debug)]
pub enum Template {
    Static(RichContent),
    Dynamic(fn(Option<&str>) -> RichContent),
}

impl Template {
    pub fn resolve(&self, arg: Option<&str>) -> RichContent {
        match self {
            Template::Static(content) => content.clone(),
            Template::Dynamic(generate) => generate(arg),
        }
    }
}

/// One slash-command definition. Immutable after definition load.
#[derive(Clone, Debug)]
pub struct PromptShortcut {
    /// Short trigger key, matched alongside the label (e.g. "bug").
    pub key: String,
    /// Display label in the popup.
    pub label: String,
    /// Description shown next to the label.
    pub description: String,
    /// Optional icon handle for hosts that render one.
    pub icon: Option<String>,
    pub template: Template,
}

impl PromptShortcut {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        template: Template,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            icon: None,
            template,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

fn select_field(label: &str, value: &str, options: &[(&str, &str)]) -> InlineNode {
    let mut metadata = Map::new();
    metadata.insert("value".to_string(), Value::String(value.to_string()));
    metadata.insert(
        "options".to_string(),
        Value::Array(
            options
                .iter()
                .map(|(label, value)| json!({"label": label, "value": value}))
                .collect(),
        ),
    );
    InlineNode::context_item(ContextItemAttrs {
        id: None,
        kind: "select".to_string(),
        label: label.to_string(),
        metadata,
    })
}

fn input_field(label: &str, placeholder: &str) -> InlineNode {
    let mut metadata = Map::new();
    metadata.insert(
        "placeholder".to_string(),
        Value::String(placeholder.to_string()),
    );
    InlineNode::context_item(ContextItemAttrs {
        id: None,
        kind: "input".to_string(),
        label: label.to_string(),
        metadata,
    })
}

fn doc(content: Vec<InlineNode>) -> Template {
    Template::Static(RichContent::Doc(Document::new(content)))
}

/// The built-in shortcut set.
pub fn default_shortcuts() -> Vec<PromptShortcut> {
    vec![
        PromptShortcut::new(
            "bug",
            "Bug Analysis",
            "Analyze code for potential bugs and security issues",
            doc(vec![
                InlineNode::text("Please analyze the following code for bugs: "),
                InlineNode::HardBreak,
                input_field("Paste Code Here", "Code snippet..."),
                InlineNode::HardBreak,
                InlineNode::text("Focus on: "),
                select_field(
                    "Focus Area",
                    "security",
                    &[
                        ("Security", "security"),
                        ("Performance", "performance"),
                        ("Logic", "logic"),
                    ],
                ),
                InlineNode::text(" "),
            ]),
        )
        .with_icon("bug"),
        PromptShortcut::new(
            "sql",
            "SQL Generator",
            "Generate SQL queries for specific databases",
            doc(vec![
                InlineNode::text("Generate a SQL query for "),
                select_field(
                    "Database",
                    "postgresql",
                    &[
                        ("PostgreSQL", "postgresql"),
                        ("MySQL", "mysql"),
                        ("Oracle", "oracle"),
                    ],
                ),
                InlineNode::text(" to: "),
                InlineNode::HardBreak,
                input_field("Requirement", "Describe what you need..."),
                InlineNode::text(" "),
            ]),
        )
        .with_icon("database"),
        PromptShortcut::new(
            "refactor",
            "Refactor Code",
            "Improve code quality and readability",
            doc(vec![
                InlineNode::text("Refactor this code to be more "),
                select_field(
                    "Goal",
                    "readable",
                    &[
                        ("Readable", "readable"),
                        ("Efficient", "efficient"),
                        ("Modern", "modern"),
                    ],
                ),
                InlineNode::text(":"),
                InlineNode::HardBreak,
                input_field("Code", "Code..."),
                InlineNode::text(" "),
            ]),
        )
        .with_icon("sparkles"),
        PromptShortcut::new(
            "explain",
            "Explain Code",
            "Explain what a piece of code does",
            doc(vec![
                InlineNode::text("Explain what this code does in "),
                select_field(
                    "Language",
                    "english",
                    &[
                        ("English", "english"),
                        ("Chinese", "chinese"),
                        ("Japanese", "japanese"),
                    ],
                ),
                InlineNode::text(":"),
                InlineNode::HardBreak,
                input_field("Code", "Paste code..."),
                InlineNode::text(" "),
            ]),
        )
        .with_icon("code"),
    ]
}
