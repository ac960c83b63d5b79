use crate::EditorEngine;
use crate::content::Document;
use crate::content::InlineNode;

/// Reference in-memory engine: a flat inline-node buffer with a unit cursor.
///
/// This is not a rich-text engine; it implements exactly the operations the
/// composer needs, with the same position semantics the composer relies on
/// (one unit per character, per hard break, per atom).
#[derive(Debug, Default)]
pub struct TextBufferEngine {
    content: Vec<InlineNode>,
    cursor: usize,
    focused: bool,
    destroyed: bool,
}

impl TextBufferEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn total_units(&self) -> usize {
        self.content.iter().map(InlineNode::units).sum()
    }

    /// Merge adjacent text nodes and drop empty ones.
    fn normalize(&mut self) {
        let mut out: Vec<InlineNode> = Vec::with_capacity(self.content.len());
        for node in self.content.drain(..) {
            match node {
                InlineNode::Text { text } if text.is_empty() => {}
                InlineNode::Text { text } => {
                    if let Some(InlineNode::Text { text: prev }) = out.last_mut() {
                        prev.push_str(&text);
                    } else {
                        out.push(InlineNode::Text { text });
                    }
                }
                other => out.push(other),
            }
        }
        self.content = out;
    }

    fn guard_destroyed(&self, op: &str) -> bool {
        if self.destroyed {
            tracing::warn!("ignoring `{op}` on a destroyed editor engine");
        }
        self.destroyed
    }
}

fn split_chars(text: &str, at: usize) -> (String, String) {
    let head: String = text.chars().take(at).collect();
    let tail: String = text.chars().skip(at).collect();
    (head, tail)
}

impl EditorEngine for TextBufferEngine {
    fn document(&self) -> Document {
        Document::new(self.content.clone())
    }

    fn set_document(&mut self, doc: Document) {
        if self.guard_destroyed("set_document") {
            return;
        }
        self.content = doc.content;
        self.normalize();
        self.cursor = self.total_units();
    }

    fn clear(&mut self) {
        if self.guard_destroyed("clear") {
            return;
        }
        self.content.clear();
        self.cursor = 0;
    }

    fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn len_units(&self) -> usize {
        self.total_units()
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.total_units());
    }

    fn insert_at(&mut self, pos: usize, nodes: &[InlineNode]) {
        if self.guard_destroyed("insert_at") || nodes.is_empty() {
            return;
        }
        let pos = pos.min(self.total_units());
        let inserted_units: usize = nodes.iter().map(InlineNode::units).sum();

        let mut out: Vec<InlineNode> = Vec::with_capacity(self.content.len() + nodes.len());
        let mut acc = 0usize;
        let mut inserted = false;
        for node in self.content.drain(..) {
            let units = node.units();
            if !inserted && pos <= acc + units {
                match &node {
                    InlineNode::Text { text } if pos > acc && pos < acc + units => {
                        let (head, tail) = split_chars(text, pos - acc);
                        out.push(InlineNode::Text { text: head });
                        out.extend(nodes.iter().cloned());
                        out.push(InlineNode::Text { text: tail });
                    }
                    _ if pos == acc => {
                        out.extend(nodes.iter().cloned());
                        out.push(node);
                    }
                    _ => {
                        out.push(node);
                        out.extend(nodes.iter().cloned());
                    }
                }
                inserted = true;
            } else {
                out.push(node);
            }
            acc += units;
        }
        if !inserted {
            out.extend(nodes.iter().cloned());
        }
        self.content = out;
        self.normalize();
        self.cursor = pos + inserted_units;
    }

    fn delete_range(&mut self, from: usize, to: usize) {
        if self.guard_destroyed("delete_range") {
            return;
        }
        let total = self.total_units();
        let from = from.min(total);
        let to = to.min(total);
        if from >= to {
            return;
        }

        let mut out: Vec<InlineNode> = Vec::with_capacity(self.content.len());
        let mut acc = 0usize;
        for node in self.content.drain(..) {
            let units = node.units();
            let (start, end) = (acc, acc + units);
            acc = end;
            if end <= from || start >= to {
                out.push(node);
                continue;
            }
            if let InlineNode::Text { text } = &node {
                let keep_head = from.saturating_sub(start);
                let keep_tail_from = to.min(end) - start;
                let mut kept: String = text.chars().take(keep_head).collect();
                kept.extend(text.chars().skip(keep_tail_from));
                if !kept.is_empty() {
                    out.push(InlineNode::Text { text: kept });
                }
            }
            // Atoms overlapping the range are dropped entirely.
        }
        self.content = out;
        self.normalize();
        self.cursor = from;
    }

    fn focus(&mut self) {
        if self.guard_destroyed("focus") {
            return;
        }
        self.focused = true;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
        self.focused = false;
        self.content.clear();
        self.cursor = 0;
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContextItemAttrs;
    use pretty_assertions::assert_eq;

    fn chip(label: &str) -> InlineNode {
        InlineNode::ContextItem {
            attrs: ContextItemAttrs {
                label: label.to_string(),
                ..ContextItemAttrs::default()
            },
        }
    }

    #[test]
    fn insert_text_mid_node_splits_and_merges() {
        let mut engine = TextBufferEngine::new();
        engine.insert_at(0, &[InlineNode::text("held")]);
        engine.insert_at(2, &[InlineNode::text("llo wor")]);
        assert_eq!(engine.document().to_plain_text(), "hello world");
        assert_eq!(engine.cursor(), 9);
        // Adjacent text nodes are merged back into one.
        assert_eq!(engine.document().content.len(), 1);
    }

    #[test]
    fn insert_atom_inside_text() {
        let mut engine = TextBufferEngine::new();
        engine.set_document(Document::from_text("ab"));
        engine.insert_at(1, &[chip("f")]);
        assert_eq!(engine.document().content.len(), 3);
        assert_eq!(engine.cursor(), 2);
        assert_eq!(engine.len_units(), 3);
    }

    #[test]
    fn delete_range_spans_text_and_atoms() {
        let mut engine = TextBufferEngine::new();
        engine.set_document(Document::new(vec![
            InlineNode::text("ab"),
            chip("x"),
            InlineNode::text("cd"),
        ]));
        // Delete "b", the chip, and "c".
        engine.delete_range(1, 4);
        assert_eq!(engine.document().to_plain_text(), "ad");
        assert_eq!(engine.cursor(), 1);
    }

    #[test]
    fn delete_range_clamps_and_ignores_empty() {
        let mut engine = TextBufferEngine::new();
        engine.set_document(Document::from_text("abc"));
        engine.delete_range(2, 2);
        engine.delete_range(2, 99);
        assert_eq!(engine.document().to_plain_text(), "ab");
    }

    #[test]
    fn set_document_moves_cursor_to_end() {
        let mut engine = TextBufferEngine::new();
        engine.set_document(Document::from_text("abc"));
        assert_eq!(engine.cursor(), 3);
        assert!(!engine.is_empty());
        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn destroy_is_idempotent_and_makes_engine_inert() {
        let mut engine = TextBufferEngine::new();
        engine.set_document(Document::from_text("abc"));
        engine.destroy();
        engine.destroy();
        assert!(engine.is_destroyed());
        assert!(engine.is_empty());

        engine.insert_at(0, &[InlineNode::text("x")]);
        engine.set_document(Document::from_text("y"));
        engine.focus();
        assert!(engine.is_empty());
        assert!(!engine.is_focused());
    }
}
