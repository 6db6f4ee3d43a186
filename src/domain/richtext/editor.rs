//! The editable surface bound to a session: document tree, selection and
//! undo history.
//!
//! Every mutating command works on a copy of the tree and commits it only
//! when the command applies, so a rejected command never leaves a partially
//! edited document behind.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::history::History;
use super::html::{self, ContentError};
use super::node::{
    style_value, Align, Block, Inline, List, ListItem, ListKind, Mark, Marks, RichText, TextBlock,
};

/// A caret position: text block index in document order plus a character
/// offset inside that block (a hard break counts as one character).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPosition {
    pub block: usize,
    pub offset: usize,
}

impl TextPosition {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: TextPosition,
    pub head: TextPosition,
}

impl Selection {
    pub fn new(anchor: TextPosition, head: TextPosition) -> Self {
        Self { anchor, head }
    }

    pub fn caret(position: TextPosition) -> Self {
        Self::new(position, position)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Start and end in document order.
    pub fn range(&self) -> (TextPosition, TextPosition) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// What `set_attribute` applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeTarget {
    Selection,
    TextBlock(usize),
}

/// Block or inline attribute. `None` removes the attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Align(Option<Align>),
    Color(Option<String>),
    FontSize(Option<String>),
    Highlight(Option<String>),
}

impl Attribute {
    /// Trims values and rejects ones that could break out of a style attribute.
    fn sanitized(self) -> Option<Self> {
        fn clean(value: Option<String>) -> Option<Option<String>> {
            match value {
                None => Some(None),
                Some(value) => style_value(&value).map(|value| Some(value.to_string())),
            }
        }
        Some(match self {
            Attribute::Align(align) => Attribute::Align(align),
            Attribute::Color(value) => Attribute::Color(clean(value)?),
            Attribute::FontSize(value) => Attribute::FontSize(clean(value)?),
            Attribute::Highlight(value) => Attribute::Highlight(clean(value)?),
        })
    }

    fn apply_to(&self, marks: &mut Marks) {
        match self {
            Attribute::Align(_) => {}
            Attribute::Color(value) => marks.color = value.clone(),
            Attribute::FontSize(value) => marks.font_size = value.clone(),
            Attribute::Highlight(value) => marks.highlight = value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    doc: RichText,
    selection: Selection,
}

/// Rich-text editor state.
#[derive(Debug, Clone)]
pub struct RichTextEditor {
    doc: RichText,
    selection: Selection,
    placeholder: String,
    history: History<Snapshot>,
}

impl RichTextEditor {
    pub fn new(placeholder: impl Into<String>, history_limit: usize) -> Self {
        Self {
            doc: RichText::empty(),
            selection: Selection::default(),
            placeholder: placeholder.into(),
            history: History::new(history_limit),
        }
    }

    /// Builds a fresh surface over a copy of this document, e.g. after a
    /// locale change. Content and selection carry over; history does not.
    pub fn rebuild(&self, placeholder: impl Into<String>) -> Self {
        let mut editor = Self::new(placeholder, self.history.limit());
        editor.doc = self.doc.clone();
        editor.selection = self.selection;
        editor
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Loads stored content. Malformed markup is replaced by an empty
    /// document so the session can still open.
    pub fn set_content(&mut self, payload: &str) {
        self.doc = match html::parse(payload) {
            Ok(doc) => doc,
            Err(err) => {
                warn!(error = %err, "Discarding malformed content");
                RichText::empty()
            }
        };
        self.history.clear();
        self.selection = self.clamp_selection(Selection::default());
    }

    /// Replaces the whole document as one undoable step.
    pub fn replace_content(&mut self, payload: &str) -> Result<(), ContentError> {
        let replacement = html::parse(payload)?;
        self.apply(|doc, _| {
            *doc = replacement;
            true
        });
        Ok(())
    }

    pub fn get_content(&self) -> String {
        html::serialize(&self.doc)
    }

    pub fn get_plain_text(&self) -> String {
        self.doc.plain_text()
    }

    pub fn document(&self) -> &RichText {
        &self.doc
    }

    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = self.clamp_selection(selection);
    }

    pub fn select_all(&mut self) {
        let end = self
            .doc
            .text_blocks()
            .iter()
            .enumerate()
            .last()
            .map(|(i, block)| TextPosition::new(i, block.char_len()))
            .unwrap_or_default();
        self.selection = Selection::new(TextPosition::default(), end);
    }

    /// First occurrence of `needle` inside a single text block.
    pub fn find_text(&self, needle: &str) -> Option<Selection> {
        if needle.is_empty() {
            return None;
        }
        self.doc
            .text_blocks()
            .iter()
            .enumerate()
            .find_map(|(i, block)| {
                let text = block.plain_text();
                let byte = text.find(needle)?;
                let start = text[..byte].chars().count();
                let end = start + needle.chars().count();
                Some(Selection::new(
                    TextPosition::new(i, start),
                    TextPosition::new(i, end),
                ))
            })
    }

    fn clamp(&self, position: TextPosition) -> TextPosition {
        let blocks = self.doc.text_blocks();
        match blocks.len() {
            0 => TextPosition::default(),
            n => {
                let block = position.block.min(n - 1);
                TextPosition::new(block, position.offset.min(blocks[block].char_len()))
            }
        }
    }

    fn clamp_selection(&self, selection: Selection) -> Selection {
        Selection::new(self.clamp(selection.anchor), self.clamp(selection.head))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds `mark` over the selection, or removes it when every selected
    /// character already carries it.
    pub fn toggle_mark(&mut self, mark: Mark) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        self.apply(|doc, selection| {
            let ranges = block_ranges(doc, selection);
            let blocks = doc.text_blocks();
            let coverage: Vec<bool> = ranges
                .iter()
                .filter_map(|&(i, start, end)| blocks[i].all_marks(start, end, |m| m.has(mark)))
                .collect();
            if coverage.is_empty() {
                return false;
            }
            let on = !coverage.iter().all(|&covered| covered);

            let mut blocks = doc.text_blocks_mut();
            for (i, start, end) in ranges {
                blocks[i].map_marks(start, end, |m| m.set(mark, on));
            }
            true
        })
    }

    pub fn set_attribute(&mut self, target: AttributeTarget, attribute: Attribute) -> bool {
        let Some(attribute) = attribute.sanitized() else {
            return false;
        };
        let ranges = match target {
            AttributeTarget::Selection => block_ranges(&self.doc, self.selection),
            AttributeTarget::TextBlock(i) => match self.doc.text_blocks().get(i) {
                Some(block) => vec![(i, 0, block.char_len())],
                None => return false,
            },
        };

        match attribute {
            Attribute::Align(align) => {
                if ranges.is_empty() {
                    return false;
                }
                self.apply(|doc, _| {
                    let mut blocks = doc.text_blocks_mut();
                    for (i, _, _) in ranges {
                        blocks[i].align = align;
                    }
                    true
                })
            }
            inline => {
                let ranges: Vec<_> = ranges.into_iter().filter(|(_, s, e)| s < e).collect();
                if ranges.is_empty() {
                    return false;
                }
                self.apply(|doc, _| {
                    let mut blocks = doc.text_blocks_mut();
                    for (i, start, end) in ranges {
                        blocks[i].map_marks(start, end, |m| inline.apply_to(m));
                    }
                    true
                })
            }
        }
    }

    /// Wraps the block at the selection head in a list, switches the kind of
    /// the enclosing list, or lifts the item out when the kind already matches.
    pub fn toggle_list(&mut self, kind: ListKind) -> bool {
        self.apply_at_head(|doc, path| match enclosing(path) {
            Wrapper::ListItem { parent, list, item } => {
                let Some(current) = list_at_mut(doc, &parent, list) else {
                    return false;
                };
                if current.kind != kind {
                    current.kind = kind;
                    return true;
                }
                lift_list_item_at(doc, &parent, list, item)
            }
            _ => wrap_at(doc, path, |block| {
                Block::List(List {
                    kind,
                    items: vec![ListItem {
                        blocks: vec![block],
                    }],
                })
            }),
        })
    }

    /// Nests the list item at the selection head under its previous sibling.
    pub fn sink_list_item(&mut self) -> bool {
        self.apply_at_head(|doc, path| match enclosing(path) {
            Wrapper::ListItem { parent, list, item } => sink_list_item_at(doc, &parent, list, item),
            _ => false,
        })
    }

    /// Moves the list item at the selection head one nesting level out.
    pub fn lift_list_item(&mut self) -> bool {
        self.apply_at_head(|doc, path| match enclosing(path) {
            Wrapper::ListItem { parent, list, item } => lift_list_item_at(doc, &parent, list, item),
            _ => false,
        })
    }

    pub fn toggle_blockquote(&mut self) -> bool {
        self.apply_at_head(|doc, path| match enclosing(path) {
            Wrapper::Blockquote { parent, quote, child } => {
                lift_from_blockquote(doc, &parent, quote, child)
            }
            _ => wrap_at(doc, path, |block| Block::Blockquote(vec![block])),
        })
    }

    /// Replaces the selection with `text`; `\n` becomes a hard break. The
    /// inserted text inherits the marks at the selection start.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let (start, end) = self.selection.range();
        if start.block != end.block || (text.is_empty() && start == end) {
            return false;
        }
        let applied = self.apply(|doc, _| {
            if doc.text_blocks().is_empty() {
                doc.blocks.push(Block::Text(TextBlock::paragraph(Vec::new())));
            }
            let mut blocks = doc.text_blocks_mut();
            let Some(block) = blocks.get_mut(start.block) else {
                return false;
            };
            let marks = block.marks_at(start.offset);
            let mut inlines = Vec::new();
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    inlines.push(Inline::HardBreak);
                }
                inlines.push(Inline::text(line, marks.clone()));
            }
            block.replace_range(start.offset, end.offset, inlines);
            true
        });
        if applied {
            let caret = TextPosition::new(start.block, start.offset + text.chars().count());
            self.selection = self.clamp_selection(Selection::caret(caret));
        }
        applied
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.selection = self.clamp_selection(snapshot.selection);
    }

    /// Runs `command` against a copy of the document and commits the copy
    /// when the command reports that it applied.
    fn apply(&mut self, command: impl FnOnce(&mut RichText, Selection) -> bool) -> bool {
        let mut next = self.doc.clone();
        if !command(&mut next, self.selection) {
            return false;
        }
        next.normalize();
        if next != self.doc {
            let previous = Snapshot {
                doc: std::mem::replace(&mut self.doc, next),
                selection: self.selection,
            };
            self.history.record(previous);
        }
        self.selection = self.clamp_selection(self.selection);
        true
    }

    fn apply_at_head(&mut self, command: impl FnOnce(&mut RichText, &[Step]) -> bool) -> bool {
        let Some(path) = locate(&self.doc.blocks, self.selection.head.block) else {
            return false;
        };
        self.apply(|doc, _| command(doc, &path))
    }
}

/// Per-block `(index, start, end)` character ranges covered by `selection`.
fn block_ranges(doc: &RichText, selection: Selection) -> Vec<(usize, usize, usize)> {
    let blocks = doc.text_blocks();
    if blocks.is_empty() {
        return Vec::new();
    }
    let (start, end) = selection.range();
    let last = end.block.min(blocks.len() - 1);
    (start.block..=last)
        .map(|i| {
            let len = blocks[i].char_len();
            let from = if i == start.block { start.offset.min(len) } else { 0 };
            let to = if i == end.block { end.offset.min(len) } else { len };
            (i, from, to.max(from))
        })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Tree paths
// ════════════════════════════════════════════════════════════════════════════════

/// One step from a block list into the tree: a block index, or an item index
/// inside the list block reached by the preceding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Block(usize),
    Item(usize),
}

/// Path to the `target`-th text block in document order.
fn locate(blocks: &[Block], target: usize) -> Option<Vec<Step>> {
    fn walk(blocks: &[Block], target: usize, seen: &mut usize, path: &mut Vec<Step>) -> bool {
        for (i, block) in blocks.iter().enumerate() {
            path.push(Step::Block(i));
            match block {
                Block::Text(_) => {
                    if *seen == target {
                        return true;
                    }
                    *seen += 1;
                }
                Block::Blockquote(children) => {
                    if walk(children, target, seen, path) {
                        return true;
                    }
                }
                Block::List(list) => {
                    for (j, item) in list.items.iter().enumerate() {
                        path.push(Step::Item(j));
                        if walk(&item.blocks, target, seen, path) {
                            return true;
                        }
                        path.pop();
                    }
                }
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    let mut seen = 0;
    walk(blocks, target, &mut seen, &mut path).then_some(path)
}

/// The block list a container path points at.
fn container_mut<'a>(mut blocks: &'a mut Vec<Block>, path: &[Step]) -> Option<&'a mut Vec<Block>> {
    let mut steps = path.iter();
    while let Some(step) = steps.next() {
        let Step::Block(i) = *step else {
            return None;
        };
        blocks = match blocks.get_mut(i)? {
            Block::Blockquote(children) => children,
            Block::List(list) => {
                let Some(Step::Item(j)) = steps.next() else {
                    return None;
                };
                &mut list.items.get_mut(*j)?.blocks
            }
            Block::Text(_) => return None,
        };
    }
    Some(blocks)
}

fn list_at_mut<'a>(doc: &'a mut RichText, parent: &[Step], list: usize) -> Option<&'a mut List> {
    match container_mut(&mut doc.blocks, parent)?.get_mut(list)? {
        Block::List(list) => Some(list),
        _ => None,
    }
}

/// Innermost structure around a text block.
enum Wrapper {
    Root,
    Blockquote {
        parent: Vec<Step>,
        quote: usize,
        child: usize,
    },
    ListItem {
        parent: Vec<Step>,
        list: usize,
        item: usize,
    },
}

fn enclosing(path: &[Step]) -> Wrapper {
    let Some((Step::Block(child), container)) = path.split_last() else {
        return Wrapper::Root;
    };
    match container {
        [parent @ .., Step::Block(quote)] => Wrapper::Blockquote {
            parent: parent.to_vec(),
            quote: *quote,
            child: *child,
        },
        [parent @ .., Step::Block(list), Step::Item(item)] => Wrapper::ListItem {
            parent: parent.to_vec(),
            list: *list,
            item: *item,
        },
        _ => Wrapper::Root,
    }
}

fn wrap_at(doc: &mut RichText, path: &[Step], wrap: impl FnOnce(Block) -> Block) -> bool {
    let Some((Step::Block(index), container)) = path.split_last() else {
        return false;
    };
    let Some(blocks) = container_mut(&mut doc.blocks, container) else {
        return false;
    };
    if *index >= blocks.len() {
        return false;
    }
    let block = blocks.remove(*index);
    blocks.insert(*index, wrap(block));
    true
}

/// Moves one child out of a blockquote, splitting the quote around it.
fn lift_from_blockquote(doc: &mut RichText, parent: &[Step], quote: usize, child: usize) -> bool {
    let Some(container) = container_mut(&mut doc.blocks, parent) else {
        return false;
    };
    let Some(Block::Blockquote(children)) = container.get_mut(quote) else {
        return false;
    };
    if child >= children.len() {
        return false;
    }
    let mut before = std::mem::take(children);
    let after = before.split_off(child + 1);
    let lifted = before.pop();

    let mut replacement = Vec::new();
    if !before.is_empty() {
        replacement.push(Block::Blockquote(before));
    }
    replacement.extend(lifted);
    if !after.is_empty() {
        replacement.push(Block::Blockquote(after));
    }
    container.splice(quote..=quote, replacement);
    true
}

fn sink_list_item_at(doc: &mut RichText, parent: &[Step], list: usize, item: usize) -> bool {
    let Some(list) = list_at_mut(doc, parent, list) else {
        return false;
    };
    if item == 0 || item >= list.items.len() {
        return false;
    }
    let kind = list.kind;
    let moved = list.items.remove(item);
    let previous = &mut list.items[item - 1];
    let joins_nested = matches!(
        previous.blocks.last(),
        Some(Block::List(nested)) if nested.kind == kind
    );
    if joins_nested {
        if let Some(Block::List(nested)) = previous.blocks.last_mut() {
            nested.items.push(moved);
        }
    } else {
        previous.blocks.push(Block::List(List {
            kind,
            items: vec![moved],
        }));
    }
    true
}

/// Lifts a list item one level. A nested item moves into the outer list
/// after its parent item and adopts its following siblings; a top-level
/// item leaves the list, splitting it in two.
fn lift_list_item_at(doc: &mut RichText, parent: &[Step], list: usize, item: usize) -> bool {
    let outer = match parent {
        [grand @ .., Step::Block(outer_list), Step::Item(outer_item)] => {
            Some((grand.to_vec(), *outer_list, *outer_item))
        }
        _ => None,
    };
    let Some(container) = container_mut(&mut doc.blocks, parent) else {
        return false;
    };
    let Some(Block::List(inner)) = container.get_mut(list) else {
        return false;
    };
    if item >= inner.items.len() {
        return false;
    }
    let kind = inner.kind;
    let tail = inner.items.split_off(item + 1);
    let Some(mut lifted) = inner.items.pop() else {
        return false;
    };

    match outer {
        Some((grand, outer_list, outer_item)) => {
            if !tail.is_empty() {
                lifted.blocks.push(Block::List(List { kind, items: tail }));
            }
            if inner.items.is_empty() {
                container.remove(list);
            }
            let Some(outer) = list_at_mut(doc, &grand, outer_list) else {
                return false;
            };
            outer.items.insert(outer_item + 1, lifted);
        }
        None => {
            let before = std::mem::take(&mut inner.items);
            let mut replacement = Vec::new();
            if !before.is_empty() {
                replacement.push(Block::List(List {
                    kind,
                    items: before,
                }));
            }
            replacement.extend(lifted.blocks);
            if !tail.is_empty() {
                replacement.push(Block::List(List { kind, items: tail }));
            }
            container.splice(list..=list, replacement);
        }
    }
    true
}
