//! The composer: the single owner of the rich-text engine instance.
//!
//! Routes key events between the engine, the suggestion popups and the
//! history navigator, and intercepts drops and pastes. The composer owns the
//! engine and the popups exclusively; nothing else mutates them. Enter
//! reports a submit request to the session rather than submitting directly,
//! and is suppressed entirely while a suggestion popup is visible so Enter
//! picks a candidate instead.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use promptline_engine::ContextItemAttrs;
use promptline_engine::Document;
use promptline_engine::EditorEngine;
use promptline_engine::InlineNode;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::history::HistoryNavigator;
use crate::history::HistoryStep;
use crate::registry::ContextItemProps;
use crate::registry::ContextItemRegistry;
use crate::registry::NoopActions;
use crate::shortcuts::PromptShortcut;
use crate::shortcuts::default_shortcuts;
use crate::suggestion::ActiveTrigger;
use crate::suggestion::CommandPopup;
use crate::suggestion::MentionCandidate;
use crate::suggestion::MentionPopup;
use crate::suggestion::SuggestionKind;
use crate::suggestion::find_active_trigger;

/// Drag payloads carrying this MIME type are internal reference drops, not
/// OS files.
pub const INTERNAL_REF_MIME: &str = "application/x-ai-ref";

pub const DEFAULT_PLACEHOLDER: &str = "Ask AI anything... (Type @ for mention, / for templates)";

/// Result of routing one key event through the composer.
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    /// The user asked to submit; the session decides whether the gate
    /// passes.
    Submitted,
    /// Consumed; the host should redraw.
    Handled,
    /// Not consumed; default handling may proceed.
    None,
}

enum ActivePopup {
    None,
    Command(CommandPopup),
    Mention(MentionPopup),
}

/// Construction parameters for [`Composer`].
pub struct ComposerParams {
    pub placeholder: Option<String>,
    /// Caller-supplied history, oldest to newest. Read-only to the core.
    pub history: Vec<String>,
    pub shortcuts: Vec<PromptShortcut>,
    pub mention_candidates: Vec<MentionCandidate>,
}

impl Default for ComposerParams {
    fn default() -> Self {
        Self {
            placeholder: None,
            history: Vec::new(),
            shortcuts: default_shortcuts(),
            mention_candidates: Vec::new(),
        }
    }
}

/// Shape of an internal reference drag payload.
#[derive(Deserialize)]
struct ReferencePayload {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

pub struct Composer {
    engine: Box<dyn EditorEngine>,
    popup: ActivePopup,
    trigger: Option<ActiveTrigger>,
    history_nav: HistoryNavigator,
    history: Vec<String>,
    shortcuts: Vec<PromptShortcut>,
    mention_candidates: Vec<MentionCandidate>,
    placeholder: String,
}

impl Composer {
    pub fn new(engine: Box<dyn EditorEngine>, params: ComposerParams) -> Self {
        Self {
            engine,
            popup: ActivePopup::None,
            trigger: None,
            history_nav: HistoryNavigator::new(),
            history: params.history,
            shortcuts: params.shortcuts,
            mention_candidates: params.mention_candidates,
            placeholder: params
                .placeholder
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Key routing
    // ------------------------------------------------------------------

    pub fn handle_key_event(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => {
                if self.popup_visible() {
                    // Escape always closes the popup and is consumed.
                    self.close_popup();
                    InputResult::Handled
                } else {
                    InputResult::None
                }
            }
            KeyCode::Up => {
                if let ActivePopup::Command(popup) = &mut self.popup {
                    popup.move_up();
                    return InputResult::Handled;
                }
                if let ActivePopup::Mention(popup) = &mut self.popup {
                    popup.move_up();
                    return InputResult::Handled;
                }
                self.history_up()
            }
            KeyCode::Down => {
                if let ActivePopup::Command(popup) = &mut self.popup {
                    popup.move_down();
                    return InputResult::Handled;
                }
                if let ActivePopup::Mention(popup) = &mut self.popup {
                    popup.move_down();
                    return InputResult::Handled;
                }
                self.history_down()
            }
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                let cursor = self.engine.cursor();
                self.engine.insert_at(cursor, &[InlineNode::HardBreak]);
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Enter => {
                if self.popup_visible() {
                    self.commit_selection();
                    InputResult::Handled
                } else {
                    InputResult::Submitted
                }
            }
            KeyCode::Tab => {
                if self.popup_visible() {
                    self.commit_selection();
                    InputResult::Handled
                } else {
                    InputResult::None
                }
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let cursor = self.engine.cursor();
                self.engine.insert_at(cursor, &[InlineNode::text(c)]);
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Backspace => {
                let cursor = self.engine.cursor();
                if cursor > 0 {
                    self.engine.delete_range(cursor - 1, cursor);
                }
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Delete => {
                let cursor = self.engine.cursor();
                if cursor < self.engine.len_units() {
                    self.engine.delete_range(cursor, cursor + 1);
                }
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Left => {
                let cursor = self.engine.cursor();
                self.engine.set_cursor(cursor.saturating_sub(1));
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Right => {
                let cursor = self.engine.cursor();
                self.engine.set_cursor(cursor + 1);
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::Home => {
                self.engine.set_cursor(0);
                self.sync_popup();
                InputResult::Handled
            }
            KeyCode::End => {
                let end = self.engine.len_units();
                self.engine.set_cursor(end);
                self.sync_popup();
                InputResult::Handled
            }
            _ => InputResult::None,
        }
    }

    // ------------------------------------------------------------------
    // History navigation
    // ------------------------------------------------------------------

    fn history_up(&mut self) -> InputResult {
        if !self.should_navigate_up() {
            return InputResult::None;
        }
        let current = self.engine.document();
        match self.history_nav.navigate_up(&self.history, &current) {
            Some(HistoryStep::Entry(text)) => {
                self.engine.set_document(Document::from_text(&text));
                InputResult::Handled
            }
            Some(HistoryStep::Draft(_)) | None => InputResult::None,
        }
    }

    fn history_down(&mut self) -> InputResult {
        if !self.history_nav.is_navigating() || !self.cursor_at_boundary_or_empty() {
            return InputResult::None;
        }
        match self.history_nav.navigate_down(&self.history) {
            Some(HistoryStep::Entry(text)) => {
                self.engine.set_document(Document::from_text(&text));
                InputResult::Handled
            }
            Some(HistoryStep::Draft(doc)) => {
                self.engine.set_document(doc);
                InputResult::Handled
            }
            None => InputResult::None,
        }
    }

    /// Up navigates from an empty document or with the cursor at the very
    /// start; while already browsing, the at-end position a recall leaves
    /// behind also counts, so repeated Up walks further back.
    fn should_navigate_up(&self) -> bool {
        if self.engine.is_empty() || self.engine.cursor() == 0 {
            return true;
        }
        self.history_nav.is_navigating() && self.engine.cursor() == self.engine.len_units()
    }

    fn cursor_at_boundary_or_empty(&self) -> bool {
        self.engine.is_empty() || self.engine.cursor() == self.engine.len_units()
    }

    // ------------------------------------------------------------------
    // Suggestion popups
    // ------------------------------------------------------------------

    pub fn popup_visible(&self) -> bool {
        !matches!(self.popup, ActivePopup::None)
    }

    /// Kind of the popup currently querying, if any.
    pub fn active_suggestion(&self) -> Option<SuggestionKind> {
        match self.popup {
            ActivePopup::None => None,
            ActivePopup::Command(_) => Some(SuggestionKind::Command),
            ActivePopup::Mention(_) => Some(SuggestionKind::Mention),
        }
    }

    /// Preferred popup height in rows for the current candidate list.
    pub fn popup_height(&self) -> u16 {
        match &self.popup {
            ActivePopup::None => 0,
            ActivePopup::Command(popup) => popup.required_height(),
            ActivePopup::Mention(popup) => popup.required_height(),
        }
    }

    /// Render the active popup into the host-chosen anchor area.
    pub fn render_popup(&self, area: Rect, buf: &mut Buffer) {
        match &self.popup {
            ActivePopup::None => {}
            ActivePopup::Command(popup) => popup.render(area, buf),
            ActivePopup::Mention(popup) => popup.render(area, buf),
        }
    }

    fn close_popup(&mut self) {
        self.popup = ActivePopup::None;
        self.trigger = None;
    }

    /// Recompute the active trigger after any document or cursor change and
    /// open, update or destroy the popup accordingly.
    fn sync_popup(&mut self) {
        let text = self.engine.document().to_plain_text();
        let trigger = find_active_trigger(&text, self.engine.cursor());
        match &trigger {
            Some(active) => {
                let updated = match &mut self.popup {
                    ActivePopup::Command(popup) if active.kind == SuggestionKind::Command => {
                        popup.on_query_change(&active.query);
                        true
                    }
                    ActivePopup::Mention(popup) if active.kind == SuggestionKind::Mention => {
                        popup.on_query_change(&active.query);
                        true
                    }
                    _ => false,
                };
                if !updated {
                    self.popup = match active.kind {
                        SuggestionKind::Command => {
                            let mut popup = CommandPopup::new(self.shortcuts.clone());
                            popup.on_query_change(&active.query);
                            ActivePopup::Command(popup)
                        }
                        SuggestionKind::Mention => {
                            let mut popup = MentionPopup::new(self.mention_candidates.clone());
                            popup.on_query_change(&active.query);
                            ActivePopup::Mention(popup)
                        }
                    };
                }
            }
            None => self.popup = ActivePopup::None,
        }
        self.trigger = trigger;
    }

    /// Replace the trigger+query span with the selected candidate's content.
    fn commit_selection(&mut self) {
        let popup = std::mem::replace(&mut self.popup, ActivePopup::None);
        let Some(trigger) = self.trigger.take() else {
            return;
        };
        let cursor = self.engine.cursor();
        let (from, mut to) = trigger.range(cursor);
        match popup {
            ActivePopup::Command(popup) => {
                if let Some(shortcut) = popup.selected_shortcut() {
                    let nodes = shortcut.template.resolve(None).into_nodes();
                    self.engine.delete_range(from, to);
                    self.engine.insert_at(from, &nodes);
                }
            }
            ActivePopup::Mention(popup) => {
                if let Some(candidate) = popup.selected_candidate() {
                    // Swallow an existing space right after the range so the
                    // inserted one does not double up.
                    let text = self.engine.document().to_plain_text();
                    if text.chars().nth(to) == Some(' ') {
                        to += 1;
                    }
                    let chip = InlineNode::context_item(ContextItemAttrs {
                        id: Some(candidate.id.clone()),
                        kind: "file".to_string(),
                        label: candidate.label.clone(),
                        metadata: Map::new(),
                    });
                    self.engine.delete_range(from, to);
                    self.engine.insert_at(from, &[chip, InlineNode::text(" ")]);
                }
            }
            ActivePopup::None => {}
        }
    }

    // ------------------------------------------------------------------
    // Drops and context items
    // ------------------------------------------------------------------

    /// Handle an internal reference drop (payload of [`INTERNAL_REF_MIME`]).
    /// Returns false and leaves the document unchanged when the payload does
    /// not parse.
    pub fn handle_reference_drop(&mut self, raw: &str, pos: Option<usize>) -> bool {
        let payload: ReferencePayload = match serde_json::from_str(raw) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!("ignoring reference drop with malformed payload: {err}");
                return false;
            }
        };
        let mut metadata = Map::new();
        if let Some(kind) = payload.kind {
            metadata.insert("originalType".to_string(), Value::String(kind));
        }
        let chip = InlineNode::context_item(ContextItemAttrs {
            id: payload.id,
            kind: "file".to_string(),
            label: payload.name,
            metadata,
        });
        let at = pos.unwrap_or_else(|| self.engine.cursor());
        self.engine.insert_at(at, &[chip]);
        self.sync_popup();
        true
    }

    /// Insert a context item at the cursor.
    pub fn insert_context_item(&mut self, attrs: ContextItemAttrs) {
        let cursor = self.engine.cursor();
        self.engine
            .insert_at(cursor, &[InlineNode::context_item(attrs)]);
        self.sync_popup();
    }

    /// Delete the context item with the given id. Returns whether a node was
    /// removed.
    pub fn delete_context_item(&mut self, id: &str) -> bool {
        let doc = self.engine.document();
        let mut pos = 0usize;
        for node in &doc.content {
            if let InlineNode::ContextItem { attrs } = node
                && attrs.id.as_deref() == Some(id)
            {
                self.engine.delete_range(pos, pos + 1);
                return true;
            }
            pos += node.units();
        }
        false
    }

    /// Patch the attributes of the context item with the given id. Patch
    /// keys: `label`, `type`, `id`, and `metadata` (merged key by key).
    pub fn update_context_item(&mut self, id: &str, patch: &Map<String, Value>) -> bool {
        let mut doc = self.engine.document();
        let cursor = self.engine.cursor();
        let mut changed = false;
        for node in &mut doc.content {
            if let InlineNode::ContextItem { attrs } = node
                && attrs.id.as_deref() == Some(id)
            {
                apply_patch(attrs, patch);
                changed = true;
            }
        }
        if changed {
            self.engine.set_document(doc);
            self.engine.set_cursor(cursor);
        }
        changed
    }

    // ------------------------------------------------------------------
    // Document access and lifecycle
    // ------------------------------------------------------------------

    pub fn document(&self) -> Document {
        self.engine.document()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.engine.cursor()
    }

    pub fn focus(&mut self) {
        self.engine.focus();
    }

    /// Clear the document and dismiss any popup.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.close_popup();
    }

    pub fn set_history(&mut self, history: Vec<String>) {
        self.history = history;
    }

    /// Replace the mention candidate list. An open mention popup re-filters
    /// against the new candidates immediately.
    pub fn set_mention_candidates(&mut self, candidates: Vec<MentionCandidate>) {
        self.mention_candidates = candidates;
        if matches!(self.popup, ActivePopup::Mention(_)) {
            // Drop the stale popup so sync rebuilds it from the new list.
            self.popup = ActivePopup::None;
            self.sync_popup();
        }
    }

    /// Echo a submission into local history recall and leave navigation.
    pub fn record_submission(&mut self, text: &str) {
        self.history_nav.record_submission(text);
    }

    /// Placeholder to show while the document is empty.
    pub fn placeholder(&self) -> Option<&str> {
        self.is_empty().then_some(self.placeholder.as_str())
    }

    /// Project the document into renderable lines, one per hard-break
    /// segment, resolving chips through the registry. A chip counts as
    /// selected when the cursor sits directly after it.
    pub fn document_lines(&self, registry: &ContextItemRegistry) -> Vec<Line<'static>> {
        let doc = self.engine.document();
        if doc.is_empty() {
            return vec![Line::from(self.placeholder.clone().dim().italic())];
        }
        let cursor = self.engine.cursor();
        let mut lines: Vec<Line<'static>> = vec![Line::default()];
        let mut pos = 0usize;
        for node in &doc.content {
            match node {
                InlineNode::Text { text } => {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(Span::raw(text.clone()));
                    }
                    pos += node.units();
                }
                InlineNode::HardBreak => {
                    lines.push(Line::default());
                    pos += 1;
                }
                InlineNode::ContextItem { attrs } => {
                    let props = ContextItemProps {
                        id: attrs.id.as_deref(),
                        label: &attrs.label,
                        kind: &attrs.kind,
                        metadata: &attrs.metadata,
                        selected: cursor == pos + 1,
                    };
                    let span = registry
                        .component(&attrs.kind)
                        .render(&props, &mut NoopActions);
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(span);
                    }
                    pos += 1;
                }
            }
        }
        lines
    }

    /// Release the engine session. Idempotent; the composer is unusable for
    /// editing afterwards.
    pub fn destroy(&mut self) {
        self.close_popup();
        self.engine.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.engine.is_destroyed()
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        if !self.engine.is_destroyed() {
            self.engine.destroy();
        }
    }
}

fn apply_patch(attrs: &mut ContextItemAttrs, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match (key.as_str(), value) {
            ("label", Value::String(label)) => attrs.label = label.clone(),
            ("type", Value::String(kind)) => attrs.kind = kind.clone(),
            ("id", Value::String(id)) => attrs.id = Some(id.clone()),
            ("metadata", Value::Object(entries)) => {
                for (meta_key, meta_value) in entries {
                    attrs.metadata.insert(meta_key.clone(), meta_value.clone());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use promptline_engine::TextBufferEngine;
    use serde_json::json;

    fn composer() -> Composer {
        Composer::new(
            Box::new(TextBufferEngine::new()),
            ComposerParams {
                mention_candidates: vec![
                    MentionCandidate::new("1", "App.vue"),
                    MentionCandidate::new("2", "main.ts"),
                    MentionCandidate::new("3", "utils.ts"),
                ],
                ..ComposerParams::default()
            },
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key_event(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_a_mention_trigger_opens_and_commits_a_chip() {
        let mut composer = composer();
        type_str(&mut composer, "@ma");
        assert_eq!(composer.active_suggestion(), Some(SuggestionKind::Mention));

        assert_eq!(composer.handle_key_event(key(KeyCode::Enter)), InputResult::Handled);
        assert!(!composer.popup_visible());

        let doc = composer.document();
        assert_eq!(doc.content.len(), 2);
        let InlineNode::ContextItem { attrs } = &doc.content[0] else {
            panic!("expected a chip, got {:?}", doc.content[0]);
        };
        assert_eq!(attrs.label, "main.ts");
        assert_eq!(attrs.id.as_deref(), Some("2"));
        assert_eq!(attrs.kind, "file");
        assert_eq!(doc.content[1], InlineNode::text(" "));
        // Cursor collapsed after the inserted chip and space.
        assert_eq!(composer.cursor(), 2);
    }

    #[test]
    fn slash_command_inserts_template_and_removes_trigger_text() {
        let mut composer = composer();
        type_str(&mut composer, "/bug");
        assert_eq!(composer.active_suggestion(), Some(SuggestionKind::Command));

        composer.handle_key_event(key(KeyCode::Enter));
        let text = composer.document().to_plain_text();
        assert!(text.starts_with("Please analyze the following code for bugs: "));
        assert!(!text.contains("/bug"));
        assert!(!composer.popup_visible());
    }

    #[test]
    fn escape_closes_the_popup_and_is_consumed() {
        let mut composer = composer();
        type_str(&mut composer, "@");
        assert!(composer.popup_visible());

        assert_eq!(composer.handle_key_event(key(KeyCode::Esc)), InputResult::Handled);
        assert!(!composer.popup_visible());
        // The query text stays; only the popup goes away.
        assert_eq!(composer.document().to_plain_text(), "@");

        assert_eq!(composer.handle_key_event(key(KeyCode::Esc)), InputResult::None);
    }

    #[test]
    fn enter_requests_submit_only_without_a_popup() {
        let mut composer = composer();
        type_str(&mut composer, "hello");
        assert_eq!(
            composer.handle_key_event(key(KeyCode::Enter)),
            InputResult::Submitted
        );

        type_str(&mut composer, " @ut");
        assert!(composer.popup_visible());
        assert_eq!(
            composer.handle_key_event(key(KeyCode::Enter)),
            InputResult::Handled
        );
    }

    #[test]
    fn moving_the_cursor_out_of_range_closes_the_popup() {
        let mut composer = composer();
        type_str(&mut composer, "@m");
        assert!(composer.popup_visible());

        composer.handle_key_event(key(KeyCode::Left));
        // Still inside the trigger span (query shrank to "").
        assert!(composer.popup_visible());
        composer.handle_key_event(key(KeyCode::Left));
        assert!(!composer.popup_visible());
    }

    #[test]
    fn shift_enter_inserts_a_hard_break() {
        let mut composer = composer();
        type_str(&mut composer, "a");
        composer.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_str(&mut composer, "b");
        assert_eq!(composer.document().to_plain_text(), "a\nb");
    }

    #[test]
    fn reference_drop_inserts_a_chip() {
        let mut composer = composer();
        let ok = composer.handle_reference_drop(
            r#"{"id": "7", "name": "Spec.pdf", "type": "document"}"#,
            None,
        );
        assert!(ok);
        let doc = composer.document();
        let InlineNode::ContextItem { attrs } = &doc.content[0] else {
            panic!("expected a chip");
        };
        assert_eq!(attrs.label, "Spec.pdf");
        assert_eq!(attrs.kind, "file");
        assert_eq!(
            attrs.metadata.get("originalType"),
            Some(&Value::String("document".to_string()))
        );
    }

    #[test]
    fn malformed_reference_drop_is_ignored() {
        let mut composer = composer();
        type_str(&mut composer, "text");
        let before = composer.document();
        assert!(!composer.handle_reference_drop("{not json", None));
        assert_eq!(composer.document(), before);
    }

    #[test]
    fn history_navigation_through_key_events() {
        let mut composer = Composer::new(
            Box::new(TextBufferEngine::new()),
            ComposerParams {
                history: vec!["cmd1".to_string(), "cmd2".to_string()],
                ..ComposerParams::default()
            },
        );

        assert_eq!(composer.handle_key_event(key(KeyCode::Up)), InputResult::Handled);
        assert_eq!(composer.document().to_plain_text(), "cmd2");
        assert_eq!(composer.handle_key_event(key(KeyCode::Up)), InputResult::Handled);
        assert_eq!(composer.document().to_plain_text(), "cmd1");
        // Past the oldest entry: unhandled, document unchanged.
        assert_eq!(composer.handle_key_event(key(KeyCode::Up)), InputResult::None);
        assert_eq!(composer.document().to_plain_text(), "cmd1");

        assert_eq!(composer.handle_key_event(key(KeyCode::Down)), InputResult::Handled);
        assert_eq!(composer.document().to_plain_text(), "cmd2");
        // Stepping past the newest entry restores the (empty) draft.
        assert_eq!(composer.handle_key_event(key(KeyCode::Down)), InputResult::Handled);
        assert!(composer.is_empty());
        assert_eq!(composer.handle_key_event(key(KeyCode::Down)), InputResult::None);
    }

    #[test]
    fn history_up_is_gated_on_cursor_position() {
        let mut composer = Composer::new(
            Box::new(TextBufferEngine::new()),
            ComposerParams {
                history: vec!["cmd1".to_string()],
                ..ComposerParams::default()
            },
        );
        type_str(&mut composer, "draft");
        // Cursor at the end of a non-empty, non-recalled document: no
        // navigation.
        assert_eq!(composer.handle_key_event(key(KeyCode::Up)), InputResult::None);
        assert_eq!(composer.document().to_plain_text(), "draft");

        composer.handle_key_event(key(KeyCode::Home));
        assert_eq!(composer.handle_key_event(key(KeyCode::Up)), InputResult::Handled);
        assert_eq!(composer.document().to_plain_text(), "cmd1");

        // Down from the recall restores the draft.
        assert_eq!(composer.handle_key_event(key(KeyCode::Down)), InputResult::Handled);
        assert_eq!(composer.document().to_plain_text(), "draft");
    }

    #[test]
    fn update_and_delete_context_item_by_id() {
        let mut composer = composer();
        composer.insert_context_item(ContextItemAttrs {
            id: Some("field-1".to_string()),
            kind: "select".to_string(),
            label: "Focus".to_string(),
            metadata: Map::new(),
        });

        let patch = json!({
            "label": "Focus Area",
            "metadata": {"value": "security"}
        });
        let Value::Object(patch) = patch else {
            unreachable!()
        };
        assert!(composer.update_context_item("field-1", &patch));

        let doc = composer.document();
        let InlineNode::ContextItem { attrs } = &doc.content[0] else {
            panic!("expected a chip");
        };
        assert_eq!(attrs.label, "Focus Area");
        assert_eq!(
            attrs.metadata.get("value"),
            Some(&Value::String("security".to_string()))
        );

        assert!(composer.delete_context_item("field-1"));
        assert!(composer.is_empty());
        assert!(!composer.delete_context_item("field-1"));
    }

    #[test]
    fn destroy_releases_the_engine() {
        let mut composer = composer();
        type_str(&mut composer, "hello");
        composer.destroy();
        assert!(composer.is_destroyed());
        assert!(composer.is_empty());
        // Destroy is idempotent.
        composer.destroy();
    }

    #[test]
    fn document_lines_resolve_chips_through_the_registry() {
        let registry = ContextItemRegistry::new();
        let mut composer = composer();
        type_str(&mut composer, "see @app");
        composer.handle_key_event(key(KeyCode::Enter));

        let lines = composer.document_lines(&registry);
        assert_eq!(lines.len(), 1);
        let rendered: String = lines[0]
            .spans
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect();
        assert_eq!(rendered, "see [App.vue] ");
    }

    #[test]
    fn placeholder_shows_only_while_empty() {
        let mut composer = composer();
        assert_eq!(composer.placeholder(), Some(DEFAULT_PLACEHOLDER));
        type_str(&mut composer, "x");
        assert_eq!(composer.placeholder(), None);
    }
}
