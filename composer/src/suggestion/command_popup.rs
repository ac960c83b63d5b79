use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::COMMAND_MATCH_LIMIT;
use super::MAX_POPUP_ROWS;
use super::popup_common::DisplayRow;
use super::popup_common::ScrollState;
use super::popup_common::render_rows;
use super::popup_common::required_height;
use crate::shortcuts::PromptShortcut;

/// The `/` popup: filters the shortcut set as the user types.
pub(crate) struct CommandPopup {
    query: String,
    shortcuts: Vec<PromptShortcut>,
    state: ScrollState,
}

impl CommandPopup {
    pub(crate) fn new(shortcuts: Vec<PromptShortcut>) -> Self {
        let mut popup = Self {
            query: String::new(),
            shortcuts,
            state: ScrollState::new(),
        };
        popup.clamp_selection();
        popup
    }

    /// Update the active filter from the text typed since the trigger.
    pub(crate) fn on_query_change(&mut self, query: &str) {
        self.query = query.to_string();
        self.clamp_selection();
    }

    /// Case-insensitive substring match against label and key, original
    /// order preserved, capped to the first [`COMMAND_MATCH_LIMIT`].
    pub(crate) fn filtered_indices(&self) -> Vec<usize> {
        let needle = self.query.to_lowercase();
        self.shortcuts
            .iter()
            .enumerate()
            .filter(|(_, shortcut)| {
                shortcut.label.to_lowercase().contains(&needle)
                    || shortcut.key.to_lowercase().contains(&needle)
            })
            .map(|(idx, _)| idx)
            .take(COMMAND_MATCH_LIMIT)
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

    pub(crate) fn selected_shortcut(&self) -> Option<&PromptShortcut> {
        let matches = self.filtered_indices();
        let idx = self.state.selected_idx?;
        matches.get(idx).and_then(|i| self.shortcuts.get(*i))
    }

    pub(crate) fn required_height(&self) -> u16 {
        required_height(self.filtered_indices().len(), MAX_POPUP_ROWS)
    }

    pub(crate) fn render(&self, area: Rect, buf: &mut Buffer) {
        let rows: Vec<DisplayRow> = self
            .filtered_indices()
            .into_iter()
            .filter_map(|idx| self.shortcuts.get(idx))
            .map(|shortcut| DisplayRow {
                name: format!("/{}", shortcut.key),
                description: Some(shortcut.description.clone()),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::Template;
    use crate::shortcuts::default_shortcuts;
    use pretty_assertions::assert_eq;
    use promptline_engine::InlineNode;
    use promptline_engine::RichContent;

    fn labels(popup: &CommandPopup) -> Vec<String> {
        popup
            .filtered_indices()
            .into_iter()
            .map(|i| popup.shortcuts[i].label.clone())
            .collect()
    }

    #[test]
    fn query_matches_label_substring_case_insensitively() {
        let mut popup = CommandPopup::new(default_shortcuts());
        popup.on_query_change("bug");
        let matched = labels(&popup);
        assert!(!matched.is_empty());
        assert!(matched[0].to_lowercase().contains("bug"));
    }

    #[test]
    fn query_matches_key_as_well() {
        let mut popup = CommandPopup::new(default_shortcuts());
        popup.on_query_change("sql");
        assert_eq!(labels(&popup), vec!["SQL Generator".to_string()]);
    }

    #[test]
    fn unmatched_query_yields_nothing() {
        let mut popup = CommandPopup::new(default_shortcuts());
        popup.on_query_change("zzz");
        assert!(labels(&popup).is_empty());
        assert_eq!(popup.selected_shortcut().map(|s| s.key.clone()), None);
    }

    #[test]
    fn matches_are_capped_and_keep_original_order() {
        let shortcuts: Vec<PromptShortcut> = (0..15)
            .map(|i| {
                PromptShortcut::new(
                    format!("cmd{i}"),
                    format!("Command {i}"),
                    "",
                    Template::Static(RichContent::Nodes(vec![InlineNode::text("x")])),
                )
            })
            .collect();
        let mut popup = CommandPopup::new(shortcuts);
        popup.on_query_change("cmd");
        let matched = labels(&popup);
        assert_eq!(matched.len(), 10);
        assert_eq!(matched[0], "Command 0");
        assert_eq!(matched[9], "Command 9");
    }

    #[test]
    fn first_match_is_selected_and_navigation_wraps() {
        let mut popup = CommandPopup::new(default_shortcuts());
        popup.on_query_change("");
        assert_eq!(
            popup.selected_shortcut().map(|s| s.key.clone()),
            Some("bug".to_string())
        );
        popup.move_up();
        assert_eq!(
            popup.selected_shortcut().map(|s| s.key.clone()),
            Some("explain".to_string())
        );
        popup.move_down();
        assert_eq!(
            popup.selected_shortcut().map(|s| s.key.clone()),
            Some("bug".to_string())
        );
    }

    #[test]
    fn narrowing_the_query_clamps_selection() {
        let mut popup = CommandPopup::new(default_shortcuts());
        popup.on_query_change("");
        popup.move_down();
        popup.move_down();
        popup.on_query_change("bug");
        assert_eq!(
            popup.selected_shortcut().map(|s| s.key.clone()),
            Some("bug".to_string())
        );
    }
}
