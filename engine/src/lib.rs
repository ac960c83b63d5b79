//! Editor-engine contract and document model for the promptline composer.
//!
//! The composer treats the rich-text engine as an external collaborator: it
//! only needs to read and write the document through a narrow set of
//! operations (insert nodes at a position, delete a range, query emptiness
//! and the cursor, clear, focus, destroy). [`EditorEngine`] captures that
//! contract; [`TextBufferEngine`] is the reference in-memory implementation
//! used by tests and by embedders that do not bring their own engine.
//!
//! Positions are measured in *units*: one unit per text character, one per
//! hard break, one per atomic context item. The plain-text projection of a
//! document ([`Document::to_plain_text`]) is aligned with units, so callers
//! can scan text character-by-character and use the indices as positions.

mod buffer;
mod content;

pub use buffer::TextBufferEngine;
pub use content::ATOM_PLACEHOLDER;
pub use content::ContextItemAttrs;
pub use content::Document;
pub use content::InlineNode;
pub use content::RichContent;

/// The narrow contract the composer consumes a rich-text engine through.
///
/// Implementations own the document; the composer never keeps a parallel
/// copy. After [`EditorEngine::destroy`] the engine is inert: mutations are
/// ignored and reads behave as if the document were empty.
pub trait EditorEngine {
    /// Export the current document content.
    fn document(&self) -> Document;

    /// Replace the document content and move the cursor to the end.
    fn set_document(&mut self, doc: Document);

    /// Remove all content and reset the cursor.
    fn clear(&mut self);

    /// True when the document holds no content.
    fn is_empty(&self) -> bool;

    /// Total document length in units.
    fn len_units(&self) -> usize;

    /// Current cursor position in units.
    fn cursor(&self) -> usize;

    /// Move the cursor, clamped to the document bounds.
    fn set_cursor(&mut self, pos: usize);

    /// Insert nodes at `pos` and collapse the cursor to just after them.
    fn insert_at(&mut self, pos: usize, nodes: &[InlineNode]);

    /// Delete the unit range `from..to` and leave the cursor at `from`.
    fn delete_range(&mut self, from: usize, to: usize);

    /// Give the engine input focus.
    fn focus(&mut self);

    /// Release the engine session. Idempotent.
    fn destroy(&mut self);

    /// True once [`EditorEngine::destroy`] has run.
    fn is_destroyed(&self) -> bool;
}
