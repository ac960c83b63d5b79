//! The suggestion protocol shared by mentions and slash commands: detect a
//! trigger character at the cursor, keep a popup querying while the user
//! types, and let the composer commit the selected candidate.

mod command_popup;
mod mention_popup;
mod popup_common;

pub(crate) use command_popup::CommandPopup;
pub use mention_popup::MentionCandidate;
pub(crate) use mention_popup::MentionPopup;

use promptline_engine::ATOM_PLACEHOLDER;

/// Maximum rows a popup shows at once; longer lists scroll.
pub(crate) const MAX_POPUP_ROWS: usize = 8;

/// Slash-command matches are capped to the first N; mentions are unbounded.
pub(crate) const COMMAND_MATCH_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuggestionKind {
    Mention,
    Command,
}

impl SuggestionKind {
    pub fn trigger_char(self) -> char {
        match self {
            SuggestionKind::Mention => '@',
            SuggestionKind::Command => '/',
        }
    }
}

/// An active trigger span: the trigger character at `start` plus the query
/// typed since it, ending at the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveTrigger {
    pub kind: SuggestionKind,
    /// Unit position of the trigger character.
    pub start: usize,
    pub query: String,
}

impl ActiveTrigger {
    /// Unit range covering trigger plus query.
    pub fn range(&self, cursor: usize) -> (usize, usize) {
        (self.start, cursor)
    }
}

/// Scan backwards from the cursor for a live trigger. A trigger is active
/// when its character sits at the document start or right after whitespace,
/// and no whitespace or atom separates it from the cursor.
pub fn find_active_trigger(text: &str, cursor: usize) -> Option<ActiveTrigger> {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());

    for i in (0..cursor).rev() {
        let ch = chars[i];
        if ch.is_whitespace() || ch == ATOM_PLACEHOLDER {
            return None;
        }
        let kind = match ch {
            '@' => SuggestionKind::Mention,
            '/' => SuggestionKind::Command,
            _ => continue,
        };
        let at_boundary = i == 0 || chars[i - 1].is_whitespace();
        if !at_boundary {
            continue;
        }
        return Some(ActiveTrigger {
            kind,
            start: i,
            query: chars[i + 1..cursor].iter().collect(),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn trigger_at_document_start() {
        let found = find_active_trigger("@ma", 3).unwrap();
        assert_eq!(found.kind, SuggestionKind::Mention);
        assert_eq!(found.start, 0);
        assert_eq!(found.query, "ma");
    }

    #[test]
    fn trigger_after_whitespace() {
        let found = find_active_trigger("fix /bu", 7).unwrap();
        assert_eq!(found.kind, SuggestionKind::Command);
        assert_eq!(found.start, 4);
        assert_eq!(found.query, "bu");
    }

    #[test]
    fn mid_word_trigger_is_inactive() {
        assert_eq!(find_active_trigger("user@host", 9), None);
        assert_eq!(find_active_trigger("path/to", 7), None);
    }

    #[test]
    fn whitespace_or_atom_breaks_the_query() {
        assert_eq!(find_active_trigger("@foo bar", 8), None);
        let text = format!("@foo{ATOM_PLACEHOLDER}x");
        assert_eq!(find_active_trigger(&text, 6), None);
    }

    #[test]
    fn cursor_before_trigger_sees_nothing() {
        assert_eq!(find_active_trigger("hi @me", 2), None);
        assert_eq!(find_active_trigger("@", 0), None);
    }

    #[test]
    fn empty_query_right_after_trigger() {
        let found = find_active_trigger("@", 1).unwrap();
        assert_eq!(found.query, "");
        assert_eq!(found.range(1), (0, 1));
    }
}
