//! Document aggregate: a draft or a template.
//!
//! Drafts and templates share one shape; `kind` tells them apart. Content is
//! canonical rich-text HTML and is only ever produced by the editor or by
//! template extraction.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::foundation::{DocumentId, Timestamp};

use super::title::derive_title;

/// Whether a document is a draft or a reusable template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Draft,
    Template,
}

/// Category of generated document.
///
/// Known categories map to fixed wire strings; anything else is carried
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DocumentType {
    #[default]
    Announcement,
    CourseRegistration,
    EventNotice,
    ScheduleRequest,
    ScheduleAnnouncement,
    ScheduleChange,
    StudentReply,
    HolidayNotice,
    FreePrompt,
    Other(String),
}

impl DocumentType {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "announcement" => DocumentType::Announcement,
            "course_registration" => DocumentType::CourseRegistration,
            "event_notice" => DocumentType::EventNotice,
            "schedule_request" => DocumentType::ScheduleRequest,
            "schedule_announcement" => DocumentType::ScheduleAnnouncement,
            "schedule_change" => DocumentType::ScheduleChange,
            "student_reply" => DocumentType::StudentReply,
            "holiday_notice" => DocumentType::HolidayNotice,
            "free_prompt" => DocumentType::FreePrompt,
            other => DocumentType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Announcement => "announcement",
            DocumentType::CourseRegistration => "course_registration",
            DocumentType::EventNotice => "event_notice",
            DocumentType::ScheduleRequest => "schedule_request",
            DocumentType::ScheduleAnnouncement => "schedule_announcement",
            DocumentType::ScheduleChange => "schedule_change",
            DocumentType::StudentReply => "student_reply",
            DocumentType::HolidayNotice => "holiday_notice",
            DocumentType::FreePrompt => "free_prompt",
            DocumentType::Other(value) => value,
        }
    }

    /// Translation key of the category label, e.g. `documentTypes.eventNotice`.
    pub fn label_key(&self) -> String {
        let mut key = String::from("documentTypes.");
        let mut upper = false;
        for ch in self.as_str().chars() {
            if ch == '_' {
                upper = true;
            } else if upper {
                key.extend(ch.to_uppercase());
                upper = false;
            } else {
                key.push(ch);
            }
        }
        key
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(DocumentType::from_wire(&value))
    }
}

/// A draft or template as exchanged with the document store.
///
/// # Invariants
///
/// - `content` is canonical rich-text HTML (possibly empty)
/// - `id` is `None` until the store has assigned one
/// - `updated_at` is only set by a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<DocumentId>,

    #[serde(default)]
    content: String,

    #[serde(default)]
    kind: DocumentKind,

    /// Legacy payloads use `type`.
    #[serde(default, alias = "type")]
    document_type: DocumentType,

    /// Older template payloads carry `name` instead of `title`.
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    title: Option<String>,

    #[serde(default = "Timestamp::now")]
    created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<Timestamp>,

    /// Generation parameters, opaque to the editing core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<serde_json::Value>,
}

impl Document {
    /// An empty draft of the given category.
    pub fn draft(id: DocumentId, document_type: DocumentType) -> Self {
        Self {
            id: Some(id),
            ..Self::blank(DocumentKind::Draft, document_type)
        }
    }

    /// A new draft that the store has not assigned an id to yet.
    pub fn blank_draft(document_type: DocumentType) -> Self {
        Self::blank(DocumentKind::Draft, document_type)
    }

    /// A new blank template that has not been persisted yet.
    pub fn blank_template(document_type: DocumentType) -> Self {
        Self::blank(DocumentKind::Template, document_type)
    }

    fn blank(kind: DocumentKind, document_type: DocumentType) -> Self {
        Self {
            id: None,
            content: String::new(),
            kind,
            document_type,
            title: None,
            created_at: Timestamp::now(),
            updated_at: None,
            source: None,
        }
    }

    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, source: serde_json::Value) -> Self {
        self.source = Some(source);
        self
    }

    /// Re-labels the document, e.g. for entries listed from the template store.
    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn document_type(&self) -> &DocumentType {
        &self.document_type
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Stored title, or one derived from the content.
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => derive_title(&self.content),
        }
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> Option<&Timestamp> {
        self.updated_at.as_ref()
    }

    pub fn source(&self) -> Option<&serde_json::Value> {
        self.source.as_ref()
    }

    pub fn is_template(&self) -> bool {
        self.kind == DocumentKind::Template
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the copy sent to the store on save.
    pub fn prepared_for_save(&self, content: String, now: Timestamp) -> Self {
        Self {
            content,
            updated_at: Some(now),
            ..self.clone()
        }
    }

    pub fn assign_id(&mut self, id: DocumentId) {
        self.id = Some(id);
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_types_roundtrip_through_wire_strings() {
        for wire in [
            "announcement",
            "course_registration",
            "event_notice",
            "schedule_request",
            "schedule_announcement",
            "schedule_change",
            "student_reply",
            "holiday_notice",
            "free_prompt",
        ] {
            let parsed = DocumentType::from_wire(wire);
            assert!(!matches!(parsed, DocumentType::Other(_)), "{wire}");
            assert_eq!(parsed.as_str(), wire);
        }
    }

    #[test]
    fn unknown_types_are_carried_through() {
        let parsed = DocumentType::from_wire("meetingMinutes");
        assert_eq!(parsed, DocumentType::Other("meetingMinutes".to_string()));
        assert_eq!(parsed.as_str(), "meetingMinutes");
    }

    #[test]
    fn label_key_is_camel_case() {
        assert_eq!(
            DocumentType::CourseRegistration.label_key(),
            "documentTypes.courseRegistration"
        );
        assert_eq!(DocumentType::Announcement.label_key(), "documentTypes.announcement");
        assert_eq!(
            DocumentType::Other("studentNotice".to_string()).label_key(),
            "documentTypes.studentNotice"
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let doc = Document::draft(DocumentId::parse("42").unwrap(), DocumentType::EventNotice)
            .with_content("<p>Hi</p>");
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["id"], "42");
        assert_eq!(value["documentType"], "event_notice");
        assert_eq!(value["kind"], "draft");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_none());
        assert!(value.get("title").is_none());
    }

    #[test]
    fn accepts_legacy_payloads() {
        let doc: Document = serde_json::from_value(json!({
            "id": 7,
            "content": "<p>Old</p>",
            "type": "holiday_notice",
            "name": "Old template",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "extra": true
        }))
        .unwrap();

        assert_eq!(doc.id().map(DocumentId::as_str), Some("7"));
        assert_eq!(doc.document_type(), &DocumentType::HolidayNotice);
        assert_eq!(doc.title(), Some("Old template"));
        assert_eq!(doc.kind(), DocumentKind::Draft);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let doc: Document = serde_json::from_value(json!({})).unwrap();
        assert!(doc.id().is_none());
        assert_eq!(doc.content(), "");
        assert_eq!(doc.document_type(), &DocumentType::Announcement);
    }

    #[test]
    fn prepared_for_save_sets_content_and_updated_at() {
        let doc = Document::blank_template(DocumentType::FreePrompt).with_source(json!({"tone": "formal"}));
        let now = Timestamp::now();
        let saved = doc.prepared_for_save("<p>New</p>".to_string(), now);

        assert_eq!(saved.content(), "<p>New</p>");
        assert_eq!(saved.updated_at(), Some(&now));
        assert_eq!(saved.source(), doc.source());
        assert!(saved.is_template());
        assert!(!saved.is_persisted());
    }

    #[test]
    fn resolved_title_prefers_stored_title() {
        let doc = Document::blank_template(DocumentType::Announcement)
            .with_content("<p>First line</p>")
            .with_title("  Named ");
        assert_eq!(doc.resolved_title(), "Named");

        let untitled = doc.clone().with_title(" ");
        assert_eq!(untitled.resolved_title(), "First line");
    }
}
