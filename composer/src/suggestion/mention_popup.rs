use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::MAX_POPUP_ROWS;
use super::popup_common::DisplayRow;
use super::popup_common::ScrollState;
use super::popup_common::render_rows;
use super::popup_common::required_height;

/// One `@`-mention target: a structured reference the host exposes
/// (files, documents, whatever the embedding app indexes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MentionCandidate {
    pub id: String,
    pub label: String,
}

impl MentionCandidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The `@` popup: filters the host-supplied candidate list.
pub(crate) struct MentionPopup {
    query: String,
    candidates: Vec<MentionCandidate>,
    state: ScrollState,
}

impl MentionPopup {
    pub(crate) fn new(candidates: Vec<MentionCandidate>) -> Self {
        let mut popup = Self {
            query: String::new(),
            candidates,
            state: ScrollState::new(),
        };
        popup.clamp_selection();
        popup
    }

    pub(crate) fn on_query_change(&mut self, query: &str) {
        self.query = query.to_string();
        self.clamp_selection();
    }

    /// Case-insensitive substring match against labels; unbounded, original
    /// order preserved.
    pub(crate) fn filtered_indices(&self) -> Vec<usize> {
        let needle = self.query.to_lowercase();
        self.candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| candidate.label.to_lowercase().contains(&needle))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub(crate) fn move_up(&mut self) {
        let len = self.filtered_indices().len();
        self.state.move_up_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    pub(crate) fn move_down(&mut self) {
        let len = self.filtered_indices().len();
        self.state.move_down_wrap(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }

    pub(crate) fn selected_candidate(&self) -> Option<&MentionCandidate> {
        let matches = self.filtered_indices();
        let idx = self.state.selected_idx?;
        matches.get(idx).and_then(|i| self.candidates.get(*i))
    }

    pub(crate) fn required_height(&self) -> u16 {
        required_height(self.filtered_indices().len(), MAX_POPUP_ROWS)
    }

    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) {
        let rows: Vec<DisplayRow> = self
            .filtered_indices()
            .into_iter()
            .filter_map(|idx| self.candidates.get(idx))
            .map(|candidate| DisplayRow {
                name: candidate.label.clone(),
                description: None,
            })
            .collect();
        render_rows(area, buf, &rows, &self.state, MAX_POPUP_ROWS, "no matches");
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_indices().len();
        self.state.clamp_selection(len);
        self.state.ensure_visible(len, MAX_POPUP_ROWS.min(len));
    }
}
