//! Translation tables for user-facing texts.
//!
//! Keys are dotted paths such as `draftEditor.placeholder`. Lookups never
//! fail: an unknown key is returned unchanged, which lets callers detect a
//! missing label by comparing against the key.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Locale codes accepted in configuration, default first.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "de"];

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Table = HashMap<&'static str, &'static str>;

static EN: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        ("draftEditor.title", "Draft Editor"),
        ("draftEditor.newDraft", "New Draft"),
        ("draftEditor.draft", "Draft"),
        ("draftEditor.template", "Template"),
        ("draftEditor.placeholder", "Start editing your document..."),
        ("draftEditor.saving", "Saving..."),
        ("draftEditor.saveSuccess", "Saved successfully"),
        ("draftEditor.saveError", "Save failed"),
        ("draftEditor.deleteSuccess", "Deleted"),
        ("draftEditor.deleteError", "Delete failed"),
        ("draftEditor.reviseSuccess", "Text revised"),
        ("draftEditor.reviseError", "Revision failed"),
        ("draftEditor.copySuccess", "Content copied to clipboard"),
        ("draftEditor.copyPlainSuccess", "Copied as plain text"),
        ("draftEditor.copyError", "Copy failed"),
        ("templates.saveSuccess", "Template \"{name}\" saved"),
        ("templates.saveError", "Saving the template failed"),
        ("templates.deleteError", "Deleting the template failed"),
        ("templates.loadError", "Templates could not be loaded"),
        ("documentTypes.announcement", "Announcement"),
        ("documentTypes.courseRegistration", "Course Registration Notice"),
        ("documentTypes.eventNotice", "Event Notice"),
        ("documentTypes.scheduleRequest", "Schedule Request"),
        ("documentTypes.scheduleAnnouncement", "Schedule Announcement"),
        ("documentTypes.scheduleChange", "Schedule Change"),
        ("documentTypes.studentReply", "Student Reply"),
        ("documentTypes.holidayNotice", "Holiday Notice"),
        ("documentTypes.freePrompt", "Free Text Generation"),
        ("documentTypes.studentNotice", "Student Notice"),
        ("documentTypes.meetingMinutes", "Meeting Minutes"),
        ("documentTypes.formalLetter", "Formal Letter"),
    ])
});

static DE: Lazy<Table> = Lazy::new(|| {
    HashMap::from([
        ("draftEditor.title", "Entwurfs-Editor"),
        ("draftEditor.newDraft", "Neuer Entwurf"),
        ("draftEditor.draft", "Entwurf"),
        ("draftEditor.template", "Vorlage"),
        ("draftEditor.placeholder", "Beginnen Sie mit der Bearbeitung Ihres Dokuments..."),
        ("draftEditor.saving", "Speichere..."),
        ("draftEditor.saveSuccess", "Erfolgreich gespeichert"),
        ("draftEditor.saveError", "Speichern fehlgeschlagen"),
        ("draftEditor.deleteSuccess", "Gelöscht"),
        ("draftEditor.deleteError", "Löschen fehlgeschlagen"),
        ("draftEditor.reviseSuccess", "Text überarbeitet"),
        ("draftEditor.reviseError", "Überarbeitung fehlgeschlagen"),
        ("draftEditor.copySuccess", "Inhalt in die Zwischenablage kopiert"),
        ("draftEditor.copyPlainSuccess", "Als reiner Text kopiert"),
        ("draftEditor.copyError", "Kopieren fehlgeschlagen"),
        ("templates.saveSuccess", "Vorlage \"{name}\" gespeichert"),
        ("templates.saveError", "Speichern der Vorlage fehlgeschlagen"),
        ("templates.deleteError", "Löschen der Vorlage fehlgeschlagen"),
        ("templates.loadError", "Vorlagen konnten nicht geladen werden"),
        ("documentTypes.announcement", "Ankündigung"),
        ("documentTypes.courseRegistration", "Kursanmeldung Benachrichtigung"),
        ("documentTypes.eventNotice", "Veranstaltungshinweis"),
        ("documentTypes.scheduleRequest", "Terminabstimmungsanfrage"),
        ("documentTypes.scheduleAnnouncement", "Terminankündigung"),
        ("documentTypes.scheduleChange", "Terminänderung"),
        ("documentTypes.studentReply", "Antwort an Studierende"),
        ("documentTypes.holidayNotice", "Feiertagsmitteilung"),
        ("documentTypes.freePrompt", "Freitextgenerierung"),
        ("documentTypes.studentNotice", "Studentische Mitteilung"),
        ("documentTypes.meetingMinutes", "Sitzungsprotokoll"),
        ("documentTypes.formalLetter", "Formeller Brief"),
    ])
});

fn table(locale: Locale) -> &'static Table {
    match locale {
        Locale::En => &*EN,
        Locale::De => &*DE,
    }
}

/// Looks up `key` and substitutes `{param}` placeholders.
///
/// Unknown keys come back unchanged.
pub fn t(locale: Locale, key: &str, params: &[(&str, &str)]) -> String {
    let Some(template) = table(locale).get(key) else {
        debug!(%locale, key, "Translation key not found");
        return key.to_string();
    };
    params
        .iter()
        .fold((*template).to_string(), |text, (name, value)| {
            text.replace(&format!("{{{name}}}"), value)
        })
}

/// A translator bound to one locale, for callers that take `Fn(&str) -> String`.
pub fn translator(locale: Locale) -> impl Fn(&str) -> String {
    move |key| t(locale, key, &[])
}
