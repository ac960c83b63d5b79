//! Selection state, row model and renderer shared by the suggestion popups.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

/// Which row of a popup list is selected, and where its scroll window sits.
///
/// An empty list has no selection; Up past the first row lands on the last
/// and vice versa.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ScrollState {
    pub selected_idx: Option<usize>,
    pub scroll_top: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validate the selection after the list changed size.
    pub fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected_idx = None;
            self.scroll_top = 0;
        } else {
            let idx = self.selected_idx.unwrap_or(0);
            self.selected_idx = Some(idx.min(len - 1));
        }
    }

    pub fn move_up_wrap(&mut self, len: usize) {
        if len == 0 {
            self.clamp_selection(0);
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(sel) => (sel + len - 1) % len,
            None => 0,
        });
    }

    pub fn move_down_wrap(&mut self, len: usize) {
        if len == 0 {
            self.clamp_selection(0);
            return;
        }
        self.selected_idx = Some(match self.selected_idx {
            Some(sel) => (sel + 1) % len,
            None => 0,
        });
    }

    /// Slide the scroll window the minimal distance that brings the
    /// selected row into the `visible_rows`-tall viewport.
    pub fn ensure_visible(&mut self, len: usize, visible_rows: usize) {
        let sel = match self.selected_idx {
            Some(sel) if len > 0 && visible_rows > 0 => sel,
            _ => {
                self.scroll_top = 0;
                return;
            }
        };
        let lowest_top = sel.saturating_sub(visible_rows - 1);
        self.scroll_top = self.scroll_top.min(sel).max(lowest_top);
    }
}

pub(crate) struct DisplayRow {
    pub name: String,
    pub description: Option<String>,
}

/// Render the visible window of `rows` into `area`, marking the selected
/// row. Shows `empty_message` when there is nothing to display.
pub(crate) fn render_rows(
    area: Rect,
    buf: &mut Buffer,
    rows: &[DisplayRow],
    state: &ScrollState,
    max_rows: usize,
    empty_message: &str,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    if rows.is_empty() {
        let line = Line::from(empty_message.to_string().dim().italic());
        buf.set_line(area.x, area.y, &line, area.width);
        return;
    }

    let visible = max_rows.min(area.height as usize).min(rows.len());
    let top = state.scroll_top.min(rows.len().saturating_sub(visible));
    for (row_idx, row) in rows.iter().enumerate().skip(top).take(visible) {
        let selected = state.selected_idx == Some(row_idx);
        let marker: Span<'static> = if selected {
            "› ".cyan()
        } else {
            Span::raw("  ")
        };
        let name: Span<'static> = if selected {
            row.name.clone().cyan().bold()
        } else {
            row.name.clone().into()
        };
        let mut spans = vec![marker, name];
        if let Some(description) = &row.description {
            spans.push(Span::raw("  "));
            spans.push(description.clone().dim());
        }
        let y = area.y + (row_idx - top) as u16;
        buf.set_line(area.x, y, &Line::from(spans), area.width);
    }
}

/// Popup height in rows for the given list, clamped to `[1, max_rows]`.
pub(crate) fn required_height(total_rows: usize, max_rows: usize) -> u16 {
    total_rows.clamp(1, max_rows.max(1)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(name: &str) -> DisplayRow {
        DisplayRow {
            name: name.to_string(),
            description: None,
        }
    }

    #[test]
    fn selection_wraps_at_both_ends() {
        let mut state = ScrollState::new();
        state.clamp_selection(3);
        assert_eq!(state.selected_idx, Some(0));
        state.move_up_wrap(3);
        assert_eq!(state.selected_idx, Some(2));
        state.move_down_wrap(3);
        assert_eq!(state.selected_idx, Some(0));
    }

    #[test]
    fn scroll_window_follows_selection() {
        let mut state = ScrollState::new();
        state.selected_idx = Some(4);
        state.ensure_visible(5, 3);
        assert_eq!(state.scroll_top, 2);
        state.selected_idx = Some(0);
        state.ensure_visible(5, 3);
        assert_eq!(state.scroll_top, 0);
    }

    #[test]
    fn empty_list_clears_selection() {
        let mut state = ScrollState::new();
        state.selected_idx = Some(2);
        state.clamp_selection(0);
        assert_eq!(state.selected_idx, None);
        assert_eq!(state.scroll_top, 0);
    }

    #[test]
    fn required_height_clamps() {
        assert_eq!(required_height(0, 8), 1);
        assert_eq!(required_height(3, 8), 3);
        assert_eq!(required_height(20, 8), 8);
    }

    #[test]
    fn selected_row_is_marked() {
        let rows = vec![row("alpha"), row("beta")];
        let mut state = ScrollState::new();
        state.clamp_selection(rows.len());
        state.move_down_wrap(rows.len());

        let area = Rect::new(0, 0, 20, 2);
        let mut buf = Buffer::empty(area);
        render_rows(area, &mut buf, &rows, &state, 8, "no matches");

        let second_line: String = (0..area.width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert!(second_line.starts_with("› beta"));
    }

    #[test]
    fn empty_list_renders_message() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        render_rows(area, &mut buf, &[], &ScrollState::new(), 8, "no matches");
        let line: String = (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect();
        assert!(line.starts_with("no matches"));
    }
}
