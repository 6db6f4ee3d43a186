//! Clipboard export with graceful degradation.
//!
//! A copy first offers HTML with a plain-text alternative; when the clipboard
//! refuses rich content the plain text alone is written. The document is
//! never modified.

use std::sync::Arc;
use std::time::Duration;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::document::Document;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::richtext;
use crate::i18n::{t, Locale};
use crate::ports::{Clipboard, ClipboardError, Notice, Notifier};

/// The two clipboard representations of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichExport {
    pub html: String,
    pub plain_text: String,
}

/// Which representation ended up on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Rich,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopyError {
    #[error("Clipboard unavailable (rich: {rich}; text: {text})")]
    ClipboardUnavailable {
        rich: ClipboardError,
        text: ClipboardError,
    },
}

impl CopyError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ClipboardUnavailable
    }
}

/// Both clipboard representations of `document`.
pub fn export_rich(document: &Document) -> RichExport {
    let html = document.content().to_string();
    let plain_text = flatten_html(&html);
    RichExport { html, plain_text }
}

/// Text content of an HTML fragment, one line per block or `<br>`.
///
/// Whitespace runs inside a line collapse to one space.
pub fn flatten_html(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let dom = match parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
    {
        Ok(dom) => dom,
        Err(err) => {
            warn!(error = %err, "HTML flattening failed, using rich-text model");
            return richtext::parse(html)
                .map(|doc| doc.plain_text())
                .unwrap_or_default();
        }
    };

    let mut lines = Lines::default();
    collect_lines(&dom.document, &mut lines);
    lines.finish()
}

#[derive(Default)]
struct Lines {
    done: Vec<String>,
    current: String,
}

impl Lines {
    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if !self.current.is_empty() && !self.current.ends_with(' ') {
                    self.current.push(' ');
                }
            } else {
                self.current.push(ch);
            }
        }
    }

    /// Ends the line at a `<br>`; empty lines are kept.
    fn hard_break(&mut self) {
        let line = self.current.trim_end().to_string();
        self.done.push(line);
        self.current.clear();
    }

    /// Ends the line at a block boundary unless nothing was written.
    fn block_boundary(&mut self) {
        if !self.current.trim().is_empty() {
            self.hard_break();
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.block_boundary();
        self.done.join("\n")
    }
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "blockquote"
            | "ul"
            | "ol"
            | "li"
            | "div"
            | "section"
            | "article"
            | "pre"
    )
}

fn collect_lines(handle: &Handle, lines: &mut Lines) {
    match &handle.data {
        NodeData::Text { contents } => {
            lines.push_text(&contents.borrow());
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.as_ref();
            match tag {
                "br" => lines.hard_break(),
                "head" | "script" | "style" | "template" => {}
                _ => {
                    let block = is_block(tag);
                    if block {
                        lines.block_boundary();
                    }
                    for child in handle.children.borrow().iter() {
                        collect_lines(child, lines);
                    }
                    if block {
                        lines.block_boundary();
                    }
                }
            }
        }
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_lines(child, lines);
            }
        }
        _ => {}
    }
}

/// Copies documents to a clipboard and reports the outcome.
pub struct ClipboardExporter {
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
    notice_duration: Duration,
    locale: Locale,
}

impl ClipboardExporter {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
        notice_duration: Duration,
    ) -> Self {
        Self {
            clipboard,
            notifier,
            notice_duration,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Writes `document` to the clipboard, degrading to plain text.
    pub async fn copy(&self, document: &Document) -> Result<CopyOutcome, CopyError> {
        let export = export_rich(document);

        let rich = match self.clipboard.write_rich(&export.html, &export.plain_text).await {
            Ok(()) => {
                debug!("Copied rich content");
                self.notify_success("draftEditor.copySuccess");
                return Ok(CopyOutcome::Rich);
            }
            Err(err) => err,
        };
        debug!(error = %rich, "Rich copy refused, falling back to plain text");

        match self.clipboard.write_text(&export.plain_text).await {
            Ok(()) => {
                self.notify_success("draftEditor.copyPlainSuccess");
                Ok(CopyOutcome::PlainText)
            }
            Err(text) => {
                let err = CopyError::ClipboardUnavailable { rich, text };
                warn!(error = %err, "Copy failed");
                let notice = DomainError::new(err.code(), t(self.locale, "draftEditor.copyError", &[]))
                    .with_detail("reason", err.to_string());
                self.notifier
                    .notify(Notice::failure(&notice, self.notice_duration));
                Err(err)
            }
        }
    }

    fn notify_success(&self, key: &str) {
        self.notifier.notify(Notice::success(
            t(self.locale, key, &[]),
            self.notice_duration,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{ClipboardContent, MemoryClipboard, RecordingNotifier};
    use crate::domain::document::DocumentType;
    use crate::ports::NoticeKind;
    use proptest::prelude::*;

    fn doc(content: &str) -> Document {
        Document::blank_template(DocumentType::Announcement).with_content(content)
    }

    fn exporter(clipboard: &MemoryClipboard, notifier: &RecordingNotifier) -> ClipboardExporter {
        ClipboardExporter::new(
            Arc::new(clipboard.clone()),
            Arc::new(notifier.clone()),
            Duration::from_millis(2000),
        )
    }

    #[test]
    fn flattens_blocks_and_breaks() {
        let html = "<h1>Title</h1><p>First <strong>bold</strong>   line<br>second</p>\
                    <ul><li><p>one</p></li><li><p>two</p></li></ul><blockquote><p>quote</p></blockquote>";
        assert_eq!(
            flatten_html(html),
            "Title\nFirst bold line\nsecond\none\ntwo\nquote"
        );
    }

    #[test]
    fn keeps_empty_lines_from_breaks() {
        assert_eq!(flatten_html("<p>a<br><br>b</p>"), "a\n\nb");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(flatten_html("<p>Tom &amp; Jerry &lt;3</p>"), "Tom & Jerry <3");
    }

    #[test]
    fn empty_content_exports_empty() {
        let export = export_rich(&doc(""));
        assert_eq!(export.html, "");
        assert_eq!(export.plain_text, "");
    }

    #[test]
    fn export_keeps_canonical_html() {
        let export = export_rich(&doc("<p style=\"text-align: center\"><em>Hi</em></p>"));
        assert_eq!(export.html, "<p style=\"text-align: center\"><em>Hi</em></p>");
        assert_eq!(export.plain_text, "Hi");
    }

    #[tokio::test]
    async fn rich_copy_succeeds() {
        let clipboard = MemoryClipboard::new();
        let notifier = RecordingNotifier::new();
        let document = doc("<p>Hello</p>");

        let outcome = exporter(&clipboard, &notifier).copy(&document).await.unwrap();

        assert_eq!(outcome, CopyOutcome::Rich);
        assert_eq!(
            clipboard.content(),
            Some(ClipboardContent::Rich {
                html: "<p>Hello</p>".to_string(),
                plain_text: "Hello".to_string(),
            })
        );
        let notice = notifier.last().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.duration, Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn falls_back_to_plain_text() {
        let clipboard = MemoryClipboard::new().with_rich_failure();
        let notifier = RecordingNotifier::new();
        let document = doc("<p>Hello <strong>there</strong></p>");

        let outcome = exporter(&clipboard, &notifier).copy(&document).await.unwrap();

        assert_eq!(outcome, CopyOutcome::PlainText);
        assert_eq!(
            clipboard.content(),
            Some(ClipboardContent::Text("Hello there".to_string()))
        );
        assert_eq!(document.content(), "<p>Hello <strong>there</strong></p>");
    }

    #[tokio::test]
    async fn total_failure_is_reported() {
        let clipboard = MemoryClipboard::new().with_rich_failure().with_text_failure();
        let notifier = RecordingNotifier::new();

        let err = exporter(&clipboard, &notifier)
            .copy(&doc("<p>x</p>"))
            .await
            .unwrap_err();

        assert!(matches!(err, CopyError::ClipboardUnavailable { .. }));
        assert_eq!(clipboard.content(), None);
        let notice = notifier.last().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.code, Some(ErrorCode::ClipboardUnavailable));
        assert_eq!(notice.message, "Copy failed");
    }

    proptest! {
        #[test]
        fn plain_text_has_no_markup_and_keeps_word_order(
            words in prop::collection::vec("[a-zA-Z0-9]{1,8}", 1..12)
        ) {
            let html = words
                .iter()
                .enumerate()
                .map(|(i, w)| match i % 3 {
                    0 => format!("<p>{}</p>", w),
                    1 => format!("<p><strong>{}</strong></p>", w),
                    _ => format!("<ul><li><p><em>{}</em></p></li></ul>", w),
                })
                .collect::<String>();

            let plain = flatten_html(&html);

            prop_assert!(!plain.contains('<'));
            let flattened: Vec<&str> = plain.split_whitespace().collect();
            let expected: Vec<&str> = words.iter().map(String::as_str).collect();
            prop_assert_eq!(flattened, expected);
        }
    }
}
