//! Renderer registry for inline context-item chips.
//!
//! Maps a context-item `kind` string to the capability that renders it. The
//! registry is seeded with four built-in kinds (`default`, `number`,
//! `select`, `date`); registration silently overwrites and lookup of an
//! unknown kind falls back to the default entry, so `get` never fails.
//! Entries may hold a deferred loader that is resolved at most once on first
//! use, transparently to callers of [`ContextItemRegistry::component`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use ratatui::style::Stylize;
use ratatui::text::Span;
use serde_json::Map;
use serde_json::Value;

pub const DEFAULT_KIND: &str = "default";

/// Attributes of one chip as handed to a renderer.
pub struct ContextItemProps<'a> {
    pub id: Option<&'a str>,
    pub label: &'a str,
    pub kind: &'a str,
    pub metadata: &'a Map<String, Value>,
    pub selected: bool,
}

/// Node-level actions a renderer may invoke in response to interaction.
pub trait ContextItemActions {
    /// Remove this node from the document.
    fn delete_node(&mut self);
    /// Patch this node's attributes (`label`, `type`, `metadata`).
    fn update_attributes(&mut self, patch: Map<String, Value>);
}

/// Actions sink for render-only call sites.
pub struct NoopActions;

impl ContextItemActions for NoopActions {
    fn delete_node(&mut self) {}
    fn update_attributes(&mut self, _patch: Map<String, Value>) {}
}

/// Renders one context item as an inline span.
pub trait ContextItemRenderer: Send + Sync {
    fn render(
        &self,
        props: &ContextItemProps<'_>,
        actions: &mut dyn ContextItemActions,
    ) -> Span<'static>;
}

/// Factory for a renderer that is loaded on first use.
pub type RendererLoader = fn() -> Arc<dyn ContextItemRenderer>;

enum RendererSlot {
    Ready(Arc<dyn ContextItemRenderer>),
    Deferred {
        loader: RendererLoader,
        cell: OnceLock<Arc<dyn ContextItemRenderer>>,
    },
}

/// Optional presentation metadata carried alongside a renderer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryMeta {
    pub label: Option<String>,
    pub icon: Option<String>,
}

/// One registry entry: a renderer (ready or deferred) plus metadata.
pub struct RegistryEntry {
    slot: RendererSlot,
    pub meta: Option<EntryMeta>,
}

impl RegistryEntry {
    pub fn new(renderer: Arc<dyn ContextItemRenderer>) -> Self {
        Self {
            slot: RendererSlot::Ready(renderer),
            meta: None,
        }
    }

    /// Entry whose renderer is produced by `loader` on first use.
    pub fn deferred(loader: RendererLoader) -> Self {
        Self {
            slot: RendererSlot::Deferred {
                loader,
                cell: OnceLock::new(),
            },
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: EntryMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// The invokable renderer, resolving a deferred loader if needed.
    pub fn renderer(&self) -> Arc<dyn ContextItemRenderer> {
        match &self.slot {
            RendererSlot::Ready(renderer) => Arc::clone(renderer),
            RendererSlot::Deferred { loader, cell } => Arc::clone(cell.get_or_init(*loader)),
        }
    }
}

impl From<Arc<dyn ContextItemRenderer>> for RegistryEntry {
    fn from(renderer: Arc<dyn ContextItemRenderer>) -> Self {
        RegistryEntry::new(renderer)
    }
}

/// Type-keyed lookup of chip renderers.
pub struct ContextItemRegistry {
    entries: HashMap<String, RegistryEntry>,
    fallback: RegistryEntry,
}

impl ContextItemRegistry {
    /// A registry seeded with the built-in kinds.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            DEFAULT_KIND.to_string(),
            RegistryEntry::new(Arc::new(DefaultChip)),
        );
        entries.insert(
            "number".to_string(),
            RegistryEntry::new(Arc::new(ValueChip { fallback: "0" })),
        );
        entries.insert(
            "select".to_string(),
            RegistryEntry::new(Arc::new(ValueChip { fallback: "..." })),
        );
        entries.insert(
            "date".to_string(),
            RegistryEntry::new(Arc::new(ValueChip {
                fallback: "yyyy-mm-dd",
            })),
        );
        Self {
            entries,
            fallback: RegistryEntry::new(Arc::new(DefaultChip)),
        }
    }

    /// Store `entry` under `kind`, replacing any prior entry.
    pub fn register(&mut self, kind: impl Into<String>, entry: impl Into<RegistryEntry>) {
        self.entries.insert(kind.into(), entry.into());
    }

    /// The entry for `kind`, or the default entry when unregistered.
    pub fn get(&self, kind: &str) -> &RegistryEntry {
        self.entries
            .get(kind)
            .or_else(|| self.entries.get(DEFAULT_KIND))
            .unwrap_or(&self.fallback)
    }

    /// Like [`ContextItemRegistry::get`], unwrapped to the renderer.
    pub fn component(&self, kind: &str) -> Arc<dyn ContextItemRenderer> {
        self.get(kind).renderer()
    }
}

impl Default for ContextItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic fallback chip: renders the label only.
struct DefaultChip;

impl ContextItemRenderer for DefaultChip {
    fn render(
        &self,
        props: &ContextItemProps<'_>,
        _actions: &mut dyn ContextItemActions,
    ) -> Span<'static> {
        let text = format!("[{}]", props.label);
        if props.selected {
            text.bold().cyan()
        } else {
            text.cyan()
        }
    }
}

/// Form-field chip: renders `label: value`, falling back to a hint when the
/// metadata carries no value yet.
struct ValueChip {
    fallback: &'static str,
}

impl ContextItemRenderer for ValueChip {
    fn render(
        &self,
        props: &ContextItemProps<'_>,
        _actions: &mut dyn ContextItemActions,
    ) -> Span<'static> {
        let value = props
            .metadata
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or(self.fallback);
        let text = format!("[{}: {value}]", props.label);
        if props.selected {
            text.bold().magenta()
        } else {
            text.magenta()
        }
    }
}
