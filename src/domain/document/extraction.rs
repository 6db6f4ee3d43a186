//! Template extraction by redaction.
//!
//! A template is derived from a document by replacing operator-chosen
//! substrings of the serialized content with a fixed placeholder.

use crate::domain::foundation::ValidationError;

use super::aggregate::Document;

/// Token substituted for every redacted occurrence.
pub const PLACEHOLDER_TOKEN: &str = "[...]";

/// Splits a comma-separated term list, trimming entries and dropping empty ones.
pub fn parse_redaction_terms(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replaces every literal, non-overlapping occurrence of each term, in order.
pub fn redact<S: AsRef<str>>(content: &str, terms: &[S]) -> String {
    terms
        .iter()
        .map(AsRef::as_ref)
        .filter(|term| !term.is_empty())
        .fold(content.to_string(), |acc, term| acc.replace(term, PLACEHOLDER_TOKEN))
}

/// Builds an unsaved template from `document`.
///
/// # Errors
///
/// - `EmptyField("name")` if `name` is blank
/// - `EmptyField("content")` if the document has no content
pub fn extract_template<S: AsRef<str>>(
    document: &Document,
    redaction_terms: &[S],
    name: &str,
) -> Result<Document, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    if document.content().trim().is_empty() {
        return Err(ValidationError::empty_field("content"));
    }

    let mut template = Document::blank_template(document.document_type().clone())
        .with_content(redact(document.content(), redaction_terms))
        .with_title(name);
    if let Some(source) = document.source() {
        template = template.with_source(source.clone());
    }
    Ok(template)
}
