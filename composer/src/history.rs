//! Shell-style Up/Down history navigation for the composer.
//!
//! Kept separate from the key-handling widget so the state machine stays
//! isolated and easy to test. The caller-supplied history list (oldest to
//! newest, read-only here) is combined with a local echo of submissions made
//! during this session; navigating Up walks from the most recent entry
//! toward the oldest, Down walks back toward the present and finally
//! restores the draft that was being typed when navigation started.

use promptline_engine::Document;

/// What a navigation step wants the composer to show.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum HistoryStep {
    /// A history entry (plain text).
    Entry(String),
    /// The draft captured when navigation started.
    Draft(Document),
}

pub(crate) struct HistoryNavigator {
    /// Steps back from the present; -1 means "not navigating".
    index: isize,
    /// Snapshot of the in-progress draft, taken on first Up.
    draft: Option<Document>,
    /// Submissions recorded this session, oldest first.
    local_echo: Vec<String>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self {
            index: -1,
            draft: None,
            local_echo: Vec::new(),
        }
    }

    pub fn is_navigating(&self) -> bool {
        self.index > -1
    }

    /// Record a submission so Up can recall it later. Consecutive
    /// duplicates are skipped; navigation state is reset either way.
    pub fn record_submission(&mut self, text: &str) {
        self.reset();
        if text.is_empty() {
            return;
        }
        if self.local_echo.last().is_some_and(|prev| prev == text) {
            return;
        }
        self.local_echo.push(text.to_string());
    }

    pub fn reset(&mut self) {
        self.index = -1;
        self.draft = None;
    }

    /// Step one entry further back. `current` is snapshotted as the draft on
    /// first activation. Returns `None` when there is nothing further back,
    /// leaving state unchanged so the caller can let the key fall through.
    pub fn navigate_up(&mut self, history: &[String], current: &Document) -> Option<HistoryStep> {
        let total = history.len() + self.local_echo.len();
        if total == 0 {
            return None;
        }
        if self.index == -1 {
            self.draft = Some(current.clone());
        }
        let next = self.index + 1;
        if next as usize >= total {
            return None;
        }
        self.index = next;
        Some(HistoryStep::Entry(self.entry_at(history, next as usize)))
    }

    /// Step one entry toward the present. Landing back at -1 restores the
    /// draft. Returns `None` when not navigating.
    pub fn navigate_down(&mut self, history: &[String]) -> Option<HistoryStep> {
        if self.index == -1 {
            return None;
        }
        let next = self.index - 1;
        self.index = next;
        if next == -1 {
            return Some(HistoryStep::Draft(self.draft.take().unwrap_or_default()));
        }
        Some(HistoryStep::Entry(self.entry_at(history, next as usize)))
    }

    /// `steps_back` = 0 is the newest combined entry.
    fn entry_at(&self, history: &[String], steps_back: usize) -> String {
        let total = history.len() + self.local_echo.len();
        let idx = total - 1 - steps_back;
        if idx < history.len() {
            history[idx].clone()
        } else {
            self.local_echo[idx - history.len()].clone()
        }
    }
}
