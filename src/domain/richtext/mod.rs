//! Rich-text document model.
//!
//! - `node` - the document tree and its normalization rules
//! - `html` - canonical HTML serialization and strict parsing
//! - `history` - bounded undo/redo stacks
//! - `editor` - the editable surface: selection, commands, history

mod editor;
mod history;
mod html;
mod node;

pub use editor::{Attribute, AttributeTarget, RichTextEditor, Selection, TextPosition};
pub use history::{History, DEFAULT_HISTORY_LIMIT};
pub use html::{parse, serialize, ContentError};
pub use node::{
    Align, Block, Inline, List, ListItem, ListKind, Mark, Marks, RichText, TextBlock, TextKind,
    DEFAULT_HIGHLIGHT,
};
