//! Titles and display labels.

use crate::domain::richtext;

use super::aggregate::Document;

/// Title used when content has no text at all.
pub const UNTITLED_TEMPLATE: &str = "Untitled Template";

/// First non-empty trimmed line of the content's text.
pub fn derive_title(content: &str) -> String {
    let text = match richtext::parse(content) {
        Ok(doc) => doc.plain_text(),
        Err(_) => content.to_string(),
    };
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNTITLED_TEMPLATE.to_string())
}

/// Heading shown for a document: the translated category label when the
/// translator knows it, else the title, else the generic editor title.
///
/// `t` returns the key itself for unknown keys.
pub fn display_label(document: &Document, t: impl Fn(&str) -> String) -> String {
    let key = document.document_type().label_key();
    let label = t(&key);
    if label != key {
        return label;
    }
    match document.title().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => t("draftEditor.title"),
    }
}
