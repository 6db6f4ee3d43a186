//! Rich-text tree: blocks, inline runs and marks.

use serde::{Deserialize, Serialize};

/// Highlight colour applied when markup carries a bare `<mark>`.
pub const DEFAULT_HIGHLIGHT: &str = "#ffff00";

/// Trims a colour or size value and rejects one that could break out of a
/// `style` declaration.
pub(crate) fn style_value(value: &str) -> Option<&str> {
    let value = value.trim();
    let safe = !value.is_empty()
        && !value.contains(&[';', '"', '<', '>'][..])
        && !value.chars().any(char::is_control);
    safe.then_some(value)
}

/// Boolean inline marks that can be toggled over a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
}

/// Character-level styling carried by a text run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
    pub font_size: Option<String>,
    pub highlight: Option<String>,
}

impl Marks {
    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
        }
    }
}

/// Horizontal alignment of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "justify",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" | "end" => Some(Align::Right),
            "justify" => Some(Align::Justify),
            _ => None,
        }
    }
}

/// Whether a text block renders as a paragraph or a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextKind {
    Paragraph,
    Heading(u8),
}

/// Inline content of a text block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inline {
    Text { text: String, marks: Marks },
    HardBreak,
}

impl Inline {
    pub fn text(text: impl Into<String>, marks: Marks) -> Self {
        Inline::Text {
            text: text.into(),
            marks,
        }
    }

    /// Length in characters; a hard break counts as one.
    pub fn char_len(&self) -> usize {
        match self {
            Inline::Text { text, .. } => text.chars().count(),
            Inline::HardBreak => 1,
        }
    }
}

/// A leaf block holding inline content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextBlock {
    pub kind: TextKind,
    pub align: Option<Align>,
    pub inlines: Vec<Inline>,
}

impl TextBlock {
    pub fn paragraph(inlines: Vec<Inline>) -> Self {
        let mut block = Self {
            kind: TextKind::Paragraph,
            align: None,
            inlines,
        };
        block.normalize();
        block
    }

    pub fn char_len(&self) -> usize {
        self.inlines.iter().map(Inline::char_len).sum()
    }

    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text { text, .. } => out.push_str(text),
                Inline::HardBreak => out.push('\n'),
            }
        }
        out
    }

    /// Drops empty runs and merges neighbours with identical marks.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.inlines.len());
        for inline in self.inlines.drain(..) {
            match inline {
                Inline::Text { text, .. } if text.is_empty() => {}
                Inline::Text { text, marks } => match merged.last_mut() {
                    Some(Inline::Text {
                        text: prev,
                        marks: prev_marks,
                    }) if *prev_marks == marks => prev.push_str(&text),
                    _ => merged.push(Inline::Text { text, marks }),
                },
                Inline::HardBreak => merged.push(Inline::HardBreak),
            }
        }
        self.inlines = merged;
    }

    /// Splits runs so that `at` falls on a run boundary and returns the index
    /// of the first inline starting at or after `at`.
    fn split_at(&mut self, at: usize) -> usize {
        let mut pos = 0;
        let mut i = 0;
        while i < self.inlines.len() {
            if pos == at {
                return i;
            }
            let len = self.inlines[i].char_len();
            if at < pos + len {
                if let Inline::Text { text, marks } = &mut self.inlines[i] {
                    let tail = text.split_off(byte_offset(text, at - pos));
                    let marks = marks.clone();
                    self.inlines.insert(i + 1, Inline::Text { text: tail, marks });
                    return i + 1;
                }
            }
            pos += len;
            i += 1;
        }
        self.inlines.len()
    }

    /// Applies `f` to the marks of every text run inside `start..end`.
    pub fn map_marks(&mut self, start: usize, end: usize, mut f: impl FnMut(&mut Marks)) {
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        for inline in &mut self.inlines[first..last] {
            if let Inline::Text { marks, .. } = inline {
                f(marks);
            }
        }
        self.normalize();
    }

    /// Returns `Some(true)` if every text character in `start..end` satisfies
    /// `pred`, `Some(false)` if one does not, `None` if the range holds no text.
    pub fn all_marks(&self, start: usize, end: usize, pred: impl Fn(&Marks) -> bool) -> Option<bool> {
        let mut pos = 0;
        let mut seen = false;
        for inline in &self.inlines {
            let len = inline.char_len();
            let overlaps = pos < end && start < pos + len;
            if overlaps {
                if let Inline::Text { marks, .. } = inline {
                    seen = true;
                    if !pred(marks) {
                        return Some(false);
                    }
                }
            }
            pos += len;
        }
        seen.then_some(true)
    }

    /// Replaces `start..end` with `inserted`.
    pub fn replace_range(&mut self, start: usize, end: usize, inserted: Vec<Inline>) {
        let first = self.split_at(start);
        let last = self.split_at(end.max(start));
        self.inlines.splice(first..last, inserted);
        self.normalize();
    }

    /// Marks a character typed at `offset` would inherit.
    pub fn marks_at(&self, offset: usize) -> Marks {
        let mut pos = 0;
        let mut fallback = None;
        for inline in &self.inlines {
            let len = inline.char_len();
            if let Inline::Text { marks, .. } = inline {
                if offset > pos && offset <= pos + len {
                    return marks.clone();
                }
                if fallback.is_none() && offset == 0 {
                    fallback = Some(marks.clone());
                }
            }
            pos += len;
        }
        fallback.unwrap_or_default()
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Kind of list container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

/// Block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Text(TextBlock),
    Blockquote(Vec<Block>),
    List(List),
}

/// An editable rich-text document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RichText {
    pub blocks: Vec<Block>,
}

impl RichText {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.normalize();
        doc
    }

    /// True when the document holds no visible text.
    pub fn is_empty(&self) -> bool {
        self.text_blocks().iter().all(|b| b.char_len() == 0)
    }

    /// Text blocks in document order.
    pub fn text_blocks(&self) -> Vec<&TextBlock> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a TextBlock>) {
            for block in blocks {
                match block {
                    Block::Text(text) => out.push(text),
                    Block::Blockquote(children) => collect(children, out),
                    Block::List(list) => {
                        for item in &list.items {
                            collect(&item.blocks, out);
                        }
                    }
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.blocks, &mut out);
        out
    }

    /// Mutable text blocks in document order.
    pub fn text_blocks_mut(&mut self) -> Vec<&mut TextBlock> {
        fn collect<'a>(blocks: &'a mut [Block], out: &mut Vec<&'a mut TextBlock>) {
            for block in blocks {
                match block {
                    Block::Text(text) => out.push(text),
                    Block::Blockquote(children) => collect(children, out),
                    Block::List(list) => {
                        for item in &mut list.items {
                            collect(&mut item.blocks, out);
                        }
                    }
                }
            }
        }
        let mut out = Vec::new();
        collect(&mut self.blocks, &mut out);
        out
    }

    /// Flattens to text; text blocks are separated by line breaks.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .map(|b| b.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn normalize(&mut self) {
        for block in self.text_blocks_mut() {
            block.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> Marks {
        Marks {
            bold: true,
            ..Marks::default()
        }
    }

    #[test]
    fn normalize_merges_equal_neighbours_and_drops_empty_runs() {
        let block = TextBlock::paragraph(vec![
            Inline::text("Hel", Marks::default()),
            Inline::text("", bold()),
            Inline::text("lo", Marks::default()),
        ]);
        assert_eq!(block.inlines, vec![Inline::text("Hello", Marks::default())]);
    }

    #[test]
    fn map_marks_splits_runs_at_char_boundaries() {
        let mut block = TextBlock::paragraph(vec![Inline::text("Grüße Welt", Marks::default())]);
        block.map_marks(0, 5, |m| m.bold = true);
        assert_eq!(
            block.inlines,
            vec![
                Inline::text("Grüße", bold()),
                Inline::text(" Welt", Marks::default()),
            ]
        );
    }

    #[test]
    fn all_marks_ignores_hard_breaks_and_reports_empty_ranges() {
        let block = TextBlock::paragraph(vec![
            Inline::text("a", bold()),
            Inline::HardBreak,
            Inline::text("b", bold()),
        ]);
        assert_eq!(block.all_marks(0, 3, |m| m.bold), Some(true));
        assert_eq!(block.all_marks(1, 2, |m| m.bold), None);
    }

    #[test]
    fn replace_range_inserts_and_deletes() {
        let mut block = TextBlock::paragraph(vec![Inline::text("Hello world", Marks::default())]);
        block.replace_range(6, 11, vec![Inline::text("there", Marks::default())]);
        assert_eq!(block.plain_text(), "Hello there");
    }

    #[test]
    fn marks_at_inherits_from_preceding_character() {
        let block = TextBlock::paragraph(vec![
            Inline::text("ab", bold()),
            Inline::text("cd", Marks::default()),
        ]);
        assert!(block.marks_at(2).bold);
        assert!(!block.marks_at(3).bold);
        assert!(block.marks_at(0).bold);
    }

    #[test]
    fn plain_text_joins_nested_blocks() {
        let doc = RichText::new(vec![
            Block::Text(TextBlock::paragraph(vec![Inline::text("Title", Marks::default())])),
            Block::List(List {
                kind: ListKind::Bullet,
                items: vec![ListItem {
                    blocks: vec![Block::Text(TextBlock::paragraph(vec![Inline::text(
                        "item",
                        Marks::default(),
                    )]))],
                }],
            }),
        ]);
        assert_eq!(doc.plain_text(), "Title\nitem");
        assert!(!doc.is_empty());
        assert!(RichText::empty().is_empty());
    }

    #[test]
    fn align_parses_css_values() {
        assert_eq!(Align::parse(" Center "), Some(Align::Center));
        assert_eq!(Align::parse("start"), Some(Align::Left));
        assert_eq!(Align::parse("middle"), None);
    }
}
