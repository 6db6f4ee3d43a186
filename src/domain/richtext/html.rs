//! Canonical HTML codec for [`RichText`].
//!
//! Serialization emits a fixed subset (`p`, `h1`-`h6`, `blockquote`, `ul`,
//! `ol`, `li`, `br`, `strong`, `em`, `u`, `mark`, `span`) with a fixed mark
//! nesting order, so `parse(serialize(doc)) == doc` for every normalized
//! document. Parsing is lenient about vocabulary (unknown inline tags keep
//! their text, containers such as `div` are transparent, bare text becomes
//! paragraphs) but strict about structure.

use std::iter::Peekable;
use std::vec::IntoIter;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token as HtmlToken, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use thiserror::Error;

use super::node::{
    style_value, Align, Block, Inline, List, ListItem, ListKind, Marks, RichText, TextBlock,
    TextKind, DEFAULT_HIGHLIGHT,
};

/// Structural problems found while parsing markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Unterminated tag on line {line}")]
    UnterminatedTag { line: u64 },

    #[error("Unterminated comment on line {line}")]
    UnterminatedComment { line: u64 },

    #[error("Unexpected closing tag </{tag}>")]
    UnexpectedEndTag { tag: String },

    #[error("Element <{tag}> is never closed")]
    Unclosed { tag: String },

    #[error("Block element <{inner}> cannot appear inside <{outer}>")]
    InvalidNesting { inner: String, outer: String },

    #[error("Unexpected {found} inside <{context}>")]
    UnexpectedContent { context: String, found: String },
}

/// Serializes a document to canonical HTML. The empty document is `""`.
pub fn serialize(doc: &RichText) -> String {
    let mut out = String::new();
    write_blocks(&doc.blocks, &mut out);
    out
}

/// Parses markup into a normalized document.
pub fn parse(input: &str) -> Result<RichText, ContentError> {
    let tokens = tokenize(input)?;
    let mut builder = TreeBuilder {
        tokens: tokens.into_iter().peekable(),
    };
    let blocks = builder.parse_blocks(None)?;
    Ok(RichText::new(blocks))
}

// ════════════════════════════════════════════════════════════════════════════════
// Serialization
// ════════════════════════════════════════════════════════════════════════════════

fn write_blocks(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Text(text) => write_text_block(text, out),
            Block::Blockquote(children) => {
                out.push_str("<blockquote>");
                write_blocks(children, out);
                out.push_str("</blockquote>");
            }
            Block::List(list) => {
                let tag = match list.kind {
                    ListKind::Bullet => "ul",
                    ListKind::Ordered => "ol",
                };
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for item in &list.items {
                    out.push_str("<li>");
                    write_blocks(&item.blocks, out);
                    out.push_str("</li>");
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn write_text_block(block: &TextBlock, out: &mut String) {
    let tag = match block.kind {
        TextKind::Paragraph => "p".to_string(),
        TextKind::Heading(level) => format!("h{}", level),
    };
    out.push('<');
    out.push_str(&tag);
    if let Some(align) = block.align {
        out.push_str(" style=\"text-align: ");
        out.push_str(align.as_str());
        out.push('"');
    }
    out.push('>');
    for inline in &block.inlines {
        match inline {
            Inline::HardBreak => out.push_str("<br>"),
            Inline::Text { text, marks } => write_run(text, marks, out),
        }
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn write_run(text: &str, marks: &Marks, out: &mut String) {
    let mut closers: Vec<&str> = Vec::new();
    if marks.bold {
        out.push_str("<strong>");
        closers.push("</strong>");
    }
    if marks.italic {
        out.push_str("<em>");
        closers.push("</em>");
    }
    if marks.underline {
        out.push_str("<u>");
        closers.push("</u>");
    }
    if let Some(color) = &marks.highlight {
        out.push_str("<mark style=\"background-color: ");
        out.push_str(&escape_attr(color));
        out.push_str("\">");
        closers.push("</mark>");
    }
    let mut styles = Vec::new();
    if let Some(color) = &marks.color {
        styles.push(format!("color: {}", escape_attr(color)));
    }
    if let Some(size) = &marks.font_size {
        styles.push(format!("font-size: {}", escape_attr(size)));
    }
    if !styles.is_empty() {
        out.push_str("<span style=\"");
        out.push_str(&styles.join("; "));
        out.push_str("\">");
        closers.push("</span>");
    }
    out.push_str(&escape_text(text));
    for closer in closers.iter().rev() {
        out.push_str(closer);
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

// ════════════════════════════════════════════════════════════════════════════════
// Tokenizer
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

/// Collects html5ever tokens into the flat stream the tree builder reads.
///
/// The tokenizer recovers from everything, so the only errors kept are
/// markup cut off by the end of input.
#[derive(Default)]
struct TokenCollector {
    tokens: Vec<Token>,
    eof_error: Option<u64>,
    error: Option<ContentError>,
}

impl TokenCollector {
    fn push_text(&mut self, text: &str) {
        if let Some(Token::Text(last)) = self.tokens.last_mut() {
            last.push_str(text);
        } else {
            self.tokens.push(Token::Text(text.to_string()));
        }
    }

    fn push_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let mut result = TokenSinkResult::Continue;
        match tag.kind {
            TagKind::StartTag => {
                if !tag.self_closing {
                    // Raw text elements must not be tokenized as markup.
                    match name.as_str() {
                        "script" | "style" => result = TokenSinkResult::RawData(RawKind::Rawtext),
                        "title" | "textarea" => result = TokenSinkResult::RawData(RawKind::Rcdata),
                        _ => {}
                    }
                }
                let attrs = tag
                    .attrs
                    .into_iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                self.tokens.push(Token::Start {
                    name,
                    attrs,
                    self_closing: tag.self_closing,
                });
            }
            TagKind::EndTag => self.tokens.push(Token::End { name }),
        }
        result
    }
}

impl TokenSink for TokenCollector {
    type Handle = ();

    fn process_token(&mut self, token: HtmlToken, line: u64) -> TokenSinkResult<()> {
        // An EOF error followed by text is a stray '<' at the very end.
        if let Some(at) = self.eof_error.take() {
            let error = match token {
                HtmlToken::CharacterTokens(_) => None,
                HtmlToken::CommentToken(_) => Some(ContentError::UnterminatedComment { line: at }),
                _ => Some(ContentError::UnterminatedTag { line: at }),
            };
            if let Some(error) = error {
                self.error.get_or_insert(error);
            }
        }
        match token {
            HtmlToken::TagToken(tag) => return self.push_tag(tag),
            HtmlToken::CharacterTokens(text) => self.push_text(&text),
            HtmlToken::ParseError(message) if message.contains("EOF") => {
                self.eof_error = Some(line);
            }
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ContentError> {
    let mut queue = BufferQueue::default();
    queue.push_back(StrTendril::from_slice(input));
    let mut tokenizer = Tokenizer::new(TokenCollector::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();

    let collector = tokenizer.sink;
    match collector.error {
        Some(error) => Err(error),
        None => Ok(collector.tokens),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tree building
// ════════════════════════════════════════════════════════════════════════════════

/// How a tag participates in the tree.
enum TagRole {
    TextBlock(TextKind),
    Blockquote,
    List(ListKind),
    ListItem,
    /// Transparent block container such as `div`.
    Container,
    /// Element whose whole subtree is dropped (`head`, `script`, ...).
    Skipped,
    Void,
    Break,
    Inline,
}

fn role(name: &str) -> TagRole {
    match name {
        "p" => TagRole::TextBlock(TextKind::Paragraph),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse().unwrap_or(1);
            TagRole::TextBlock(TextKind::Heading(level))
        }
        "blockquote" => TagRole::Blockquote,
        "ul" => TagRole::List(ListKind::Bullet),
        "ol" => TagRole::List(ListKind::Ordered),
        "li" => TagRole::ListItem,
        "div" | "section" | "article" | "main" | "header" | "footer" | "body" | "html"
        | "center" | "figure" => TagRole::Container,
        "head" | "title" | "style" | "script" | "template" => TagRole::Skipped,
        "img" | "hr" | "wbr" | "input" | "meta" | "link" | "col" | "source" => TagRole::Void,
        "br" => TagRole::Break,
        _ => TagRole::Inline,
    }
}

fn is_block_level(name: &str) -> bool {
    !matches!(role(name), TagRole::Inline | TagRole::Break | TagRole::Void)
}

fn style_properties(attrs: &[(String, String)]) -> Vec<(String, String)> {
    attrs
        .iter()
        .filter(|(name, _)| name == "style")
        .flat_map(|(_, style)| style.split(';'))
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let value = style_value(value)?;
            Some((prop.trim().to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
        .filter(|v| !v.trim().is_empty())
}

fn text_align(attrs: &[(String, String)]) -> Option<Align> {
    style_properties(attrs)
        .into_iter()
        .find(|(prop, _)| prop == "text-align")
        .and_then(|(_, value)| Align::parse(&value))
        .or_else(|| attr(attrs, "align").and_then(Align::parse))
}

/// Marks contributed by an inline element on top of `parent`.
fn child_marks(name: &str, attrs: &[(String, String)], parent: &Marks) -> Marks {
    let mut marks = parent.clone();
    match name {
        "strong" | "b" => marks.bold = true,
        "em" | "i" => marks.italic = true,
        "u" => marks.underline = true,
        "mark" => {
            let color = style_properties(attrs)
                .into_iter()
                .find(|(prop, _)| prop == "background-color")
                .map(|(_, v)| v)
                .or_else(|| attr(attrs, "data-color").and_then(style_value).map(str::to_string))
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT.to_string());
            marks.highlight = Some(color);
        }
        _ => {}
    }
    if name != "mark" {
        for (prop, value) in style_properties(attrs) {
            match prop.as_str() {
                "color" => marks.color = Some(value),
                "font-size" => marks.font_size = Some(value),
                "background-color" => marks.highlight = Some(value),
                "font-weight" if value == "bold" || value == "700" => marks.bold = true,
                "font-style" if value == "italic" => marks.italic = true,
                _ => {}
            }
        }
    }
    marks
}

struct TreeBuilder {
    tokens: Peekable<IntoIter<Token>>,
}

impl TreeBuilder {
    /// Parses block content until the end tag `until` (or end of input at the root).
    fn parse_blocks(&mut self, until: Option<&str>) -> Result<Vec<Block>, ContentError> {
        let mut blocks = Vec::new();
        loop {
            let Some(token) = self.tokens.peek() else {
                return match until {
                    None => Ok(blocks),
                    Some(tag) => Err(ContentError::Unclosed {
                        tag: tag.to_string(),
                    }),
                };
            };
            match token {
                Token::End { name } => {
                    if until == Some(name.as_str()) {
                        self.tokens.next();
                        return Ok(blocks);
                    }
                    return Err(ContentError::UnexpectedEndTag { tag: name.clone() });
                }
                Token::Text(text) if text.trim().is_empty() => {
                    self.tokens.next();
                }
                Token::Text(_) => blocks.extend(self.parse_loose()?),
                Token::Start { name, .. } => match role(name) {
                    TagRole::Inline | TagRole::Break => blocks.extend(self.parse_loose()?),
                    _ => blocks.extend(self.parse_block_element(until)?),
                },
            }
        }
    }

    /// Consumes one block-level element. Transparent containers yield their
    /// children; skipped and void elements yield nothing.
    fn parse_block_element(&mut self, parent: Option<&str>) -> Result<Vec<Block>, ContentError> {
        let Some(Token::Start {
            name,
            attrs,
            self_closing,
        }) = self.tokens.next()
        else {
            return Ok(Vec::new());
        };
        if self_closing {
            return Ok(Vec::new());
        }
        match role(&name) {
            TagRole::TextBlock(kind) => {
                let inlines = self.parse_inlines(&Marks::default(), &name)?;
                let mut block = TextBlock {
                    kind,
                    align: text_align(&attrs),
                    inlines,
                };
                block.normalize();
                Ok(vec![Block::Text(block)])
            }
            TagRole::Blockquote => Ok(vec![Block::Blockquote(
                self.parse_blocks(Some("blockquote"))?,
            )]),
            TagRole::List(kind) => Ok(vec![Block::List(self.parse_list(kind, &name)?)]),
            TagRole::Container => self.parse_blocks(Some(&name)),
            TagRole::Skipped => {
                self.skip_until(&name)?;
                Ok(Vec::new())
            }
            TagRole::ListItem => Err(ContentError::UnexpectedContent {
                context: parent.unwrap_or("document").to_string(),
                found: "<li>".to_string(),
            }),
            TagRole::Void | TagRole::Break | TagRole::Inline => Ok(Vec::new()),
        }
    }

    fn parse_list(&mut self, kind: ListKind, tag: &str) -> Result<List, ContentError> {
        let mut items = Vec::new();
        loop {
            match self.tokens.next() {
                None => {
                    return Err(ContentError::Unclosed {
                        tag: tag.to_string(),
                    })
                }
                Some(Token::End { name }) if name == tag => return Ok(List { kind, items }),
                Some(Token::End { name }) => return Err(ContentError::UnexpectedEndTag { tag: name }),
                Some(Token::Text(text)) if text.trim().is_empty() => {}
                Some(Token::Start {
                    name, self_closing, ..
                }) if name == "li" => {
                    let blocks = if self_closing {
                        Vec::new()
                    } else {
                        self.parse_blocks(Some("li"))?
                    };
                    items.push(ListItem { blocks });
                }
                Some(Token::Start { name, .. }) => {
                    return Err(ContentError::UnexpectedContent {
                        context: tag.to_string(),
                        found: format!("<{}>", name),
                    })
                }
                Some(Token::Text(_)) => {
                    return Err(ContentError::UnexpectedContent {
                        context: tag.to_string(),
                        found: "text".to_string(),
                    })
                }
            }
        }
    }

    /// Parses inline content until `</until>`.
    fn parse_inlines(&mut self, marks: &Marks, until: &str) -> Result<Vec<Inline>, ContentError> {
        let mut inlines = Vec::new();
        loop {
            match self.tokens.next() {
                None => {
                    return Err(ContentError::Unclosed {
                        tag: until.to_string(),
                    })
                }
                Some(Token::End { name }) if name == until => return Ok(inlines),
                Some(Token::End { name }) => return Err(ContentError::UnexpectedEndTag { tag: name }),
                Some(Token::Text(text)) => inlines.push(Inline::text(text, marks.clone())),
                Some(Token::Start {
                    name,
                    attrs,
                    self_closing,
                }) => match role(&name) {
                    TagRole::Break => inlines.push(Inline::HardBreak),
                    TagRole::Void => {}
                    TagRole::Inline if self_closing => {}
                    TagRole::Inline => {
                        let marks = child_marks(&name, &attrs, marks);
                        inlines.extend(self.parse_inlines(&marks, &name)?);
                    }
                    _ => {
                        return Err(ContentError::InvalidNesting {
                            inner: name,
                            outer: until.to_string(),
                        })
                    }
                },
            }
        }
    }

    /// Collects inline content that is not wrapped in a text block. Each line
    /// becomes its own paragraph; blank lines are dropped.
    fn parse_loose(&mut self) -> Result<Vec<Block>, ContentError> {
        let mut inlines = Vec::new();
        while let Some(token) = self.tokens.peek() {
            match token {
                Token::End { .. } => break,
                Token::Start { name, .. } if is_block_level(name) => break,
                _ => {}
            }
            match self.tokens.next() {
                Some(Token::Text(text)) => inlines.push(Inline::text(text, Marks::default())),
                Some(Token::Start {
                    name,
                    attrs,
                    self_closing,
                }) => match role(&name) {
                    TagRole::Break => inlines.push(Inline::HardBreak),
                    TagRole::Inline if !self_closing => {
                        let marks = child_marks(&name, &attrs, &Marks::default());
                        inlines.extend(self.parse_inlines(&marks, &name)?);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        Ok(split_lines(inlines))
    }

    fn skip_until(&mut self, tag: &str) -> Result<(), ContentError> {
        loop {
            match self.tokens.next() {
                None => {
                    return Err(ContentError::Unclosed {
                        tag: tag.to_string(),
                    })
                }
                Some(Token::End { name }) if name == tag => return Ok(()),
                Some(_) => {}
            }
        }
    }
}

fn split_lines(inlines: Vec<Inline>) -> Vec<Block> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<Inline> = Vec::new();
    for inline in inlines {
        match inline {
            Inline::Text { text, marks } => {
                let segments: Vec<&str> = text.split('\n').collect();
                let last = segments.len() - 1;
                for (i, segment) in segments.into_iter().enumerate() {
                    let mut line = segment;
                    if i > 0 {
                        line = line.trim_start();
                    }
                    if i < last {
                        line = line.trim_end();
                    }
                    current.push(Inline::text(line, marks.clone()));
                    if i < last {
                        flush_paragraph(&mut current, &mut paragraphs);
                    }
                }
            }
            Inline::HardBreak => current.push(Inline::HardBreak),
        }
    }
    flush_paragraph(&mut current, &mut paragraphs);
    paragraphs
}

fn flush_paragraph(current: &mut Vec<Inline>, paragraphs: &mut Vec<Block>) {
    let block = TextBlock::paragraph(std::mem::take(current));
    if !block.plain_text().trim().is_empty() {
        paragraphs.push(Block::Text(block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(html: &str) -> String {
        serialize(&parse(html).unwrap())
    }

    #[test]
    fn canonical_markup_roundtrips_exactly() {
        let html = "<h2 style=\"text-align: center\">Notice</h2>\
            <p>Dear <strong>students</strong>,<br>the office is <em><u>closed</u></em>.</p>\
            <blockquote><p>Quoted</p></blockquote>\
            <ul><li><p>One</p></li><li><p>Two</p><ol><li><p>Nested</p></li></ol></li></ul>\
            <p><mark style=\"background-color: #ffff00\"><span style=\"color: red; font-size: 18px\">Hot</span></mark></p>";
        assert_eq!(roundtrip(html), html);
    }

    #[test]
    fn empty_payload_is_empty_document() {
        let doc = parse("").unwrap();
        assert!(doc.blocks.is_empty());
        assert_eq!(serialize(&doc), "");
    }

    #[test]
    fn bare_text_becomes_paragraph_per_line() {
        let doc = parse("First line\n\n  Second line  \n").unwrap();
        assert_eq!(serialize(&doc), "<p>First line</p><p>Second line</p>");
    }

    #[test]
    fn legacy_tags_map_to_canonical_marks() {
        assert_eq!(
            roundtrip("<p><b>bold</b> and <i>italic</i></p>"),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn bare_mark_uses_default_highlight() {
        assert_eq!(
            roundtrip("<p><mark>x</mark></p>"),
            "<p><mark style=\"background-color: #ffff00\">x</mark></p>"
        );
    }

    #[test]
    fn containers_are_transparent_and_unknown_inlines_keep_text() {
        assert_eq!(
            roundtrip("<div><p>Visit <a href=\"https://example.org\">our site</a></p></div>"),
            "<p>Visit our site</p>"
        );
    }

    #[test]
    fn loose_list_item_text_is_wrapped() {
        assert_eq!(
            roundtrip("<ul>\n  <li>Alpha</li>\n  <li>Beta</li>\n</ul>"),
            "<ul><li><p>Alpha</p></li><li><p>Beta</p></li></ul>"
        );
    }

    #[test]
    fn entities_are_decoded_and_reescaped() {
        let doc = parse("<p>Fish &amp; chips &lt;3 &#169; &#x41; &bogus;</p>").unwrap();
        assert_eq!(doc.plain_text(), "Fish & chips <3 © A &bogus;");
        assert_eq!(
            serialize(&doc),
            "<p>Fish &amp; chips &lt;3 © A &amp;bogus;</p>"
        );
    }

    #[test]
    fn named_entities_are_decoded_in_text_and_attributes() {
        let doc = parse("<p>Pr&uuml;fung am Montag &ndash; Raum&nbsp;1 <mark data-color=\"&#35;ff0\">neu</mark></p>")
            .unwrap();
        assert_eq!(doc.plain_text(), "Prüfung am Montag – Raum\u{a0}1 neu");
        let html = serialize(&doc);
        assert_eq!(
            html,
            "<p>Prüfung am Montag – Raum\u{a0}1 <mark style=\"background-color: #ff0\">neu</mark></p>"
        );
        assert_eq!(parse(&html).unwrap(), doc);
    }

    #[test]
    fn unsafe_style_values_are_dropped_at_parse_time() {
        let doc = parse("<p><mark data-color=\"red; font-size: 40px\">x</mark></p>").unwrap();
        assert_eq!(
            serialize(&doc),
            "<p><mark style=\"background-color: #ffff00\">x</mark></p>"
        );
        assert_eq!(parse(&serialize(&doc)).unwrap(), doc);

        let doc = parse("<p><span style=\"color: red; font-size: &quot;40px\">x</span></p>").unwrap();
        assert_eq!(serialize(&doc), "<p><span style=\"color: red\">x</span></p>");
    }

    #[test]
    fn script_bodies_are_not_tokenized_as_markup() {
        assert_eq!(
            roundtrip("<p>Body</p><script>if (a<b && c</p>) {}</script><p>After</p>"),
            "<p>Body</p><p>After</p>"
        );
    }

    #[test]
    fn comments_doctype_and_head_are_skipped() {
        assert_eq!(
            roundtrip("<!DOCTYPE html><html><head><title>T</title></head><body><!-- c --><p>Body</p></body></html>"),
            "<p>Body</p>"
        );
    }

    #[test]
    fn literal_less_than_is_text() {
        assert_eq!(parse("<p>a < b</p>").unwrap().plain_text(), "a < b");
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        assert_eq!(
            parse("<p><strong>x</em></p>"),
            Err(ContentError::UnexpectedEndTag {
                tag: "em".to_string()
            })
        );
    }

    #[test]
    fn unclosed_element_is_rejected() {
        assert_eq!(
            parse("<p>never closed"),
            Err(ContentError::Unclosed {
                tag: "p".to_string()
            })
        );
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        assert!(matches!(
            parse("<p>ok</p><strong class=\"x"),
            Err(ContentError::UnterminatedTag { .. })
        ));
    }

    #[test]
    fn unterminated_comment_is_rejected() {
        assert_eq!(
            parse("<p>ok</p>\n<!-- open"),
            Err(ContentError::UnterminatedComment { line: 2 })
        );
    }

    #[test]
    fn trailing_less_than_is_text() {
        assert_eq!(parse("<p>a</p>b <").unwrap().plain_text(), "a\nb <");
    }

    #[test]
    fn block_inside_inline_is_rejected() {
        assert!(matches!(
            parse("<p><strong><p>x</p></strong></p>"),
            Err(ContentError::InvalidNesting { .. })
        ));
    }

    #[test]
    fn text_directly_inside_list_is_rejected() {
        assert!(matches!(
            parse("<ul>stray<li>x</li></ul>"),
            Err(ContentError::UnexpectedContent { .. })
        ));
    }

    /// Any value the sanitizer accepts, including `&`, `:` and quotes.
    fn style_value_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9#(),.;: %&'-]{1,12}"
            .prop_filter_map("unsafe style value", |value| style_value(&value).map(str::to_string))
    }

    fn marks_strategy() -> impl Strategy<Value = Marks> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            proptest::option::of(style_value_strategy()),
            proptest::option::of(style_value_strategy()),
            proptest::option::of(style_value_strategy()),
        )
            .prop_map(|(bold, italic, underline, color, font_size, highlight)| Marks {
                bold,
                italic,
                underline,
                color,
                font_size,
                highlight,
            })
    }

    fn inline_strategy() -> impl Strategy<Value = Inline> {
        prop_oneof![
            4 => ("[a-zA-Z0-9 &<>\"'äß]{1,8}", marks_strategy())
                .prop_map(|(text, marks)| Inline::text(text, marks)),
            1 => Just(Inline::HardBreak),
        ]
    }

    fn text_block_strategy() -> impl Strategy<Value = TextBlock> {
        (
            prop_oneof![
                Just(TextKind::Paragraph),
                (1u8..=6).prop_map(TextKind::Heading)
            ],
            proptest::option::of(prop_oneof![
                Just(Align::Left),
                Just(Align::Center),
                Just(Align::Right),
                Just(Align::Justify)
            ]),
            proptest::collection::vec(inline_strategy(), 0..6),
        )
            .prop_map(|(kind, align, inlines)| {
                let mut block = TextBlock {
                    kind,
                    align,
                    inlines,
                };
                block.normalize();
                block
            })
    }

    fn block_strategy() -> impl Strategy<Value = Block> {
        let leaf = text_block_strategy().prop_map(Block::Text);
        leaf.prop_recursive(3, 16, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..3).prop_map(Block::Blockquote),
                (
                    prop_oneof![Just(ListKind::Bullet), Just(ListKind::Ordered)],
                    proptest::collection::vec(
                        proptest::collection::vec(inner, 0..3)
                            .prop_map(|blocks| ListItem { blocks }),
                        0..3
                    )
                )
                    .prop_map(|(kind, items)| Block::List(List { kind, items })),
            ]
        })
    }

    proptest! {
        #[test]
        fn serialized_content_reparses_to_the_same_tree(
            blocks in proptest::collection::vec(block_strategy(), 0..5)
        ) {
            let doc = RichText::new(blocks);
            let html = serialize(&doc);
            let reparsed = parse(&html).unwrap();
            prop_assert_eq!(&reparsed, &doc);
            prop_assert_eq!(serialize(&reparsed), html);
        }

        #[test]
        fn parsed_style_values_reparse_unchanged(value in "[ -~]{0,16}") {
            let html = format!(
                "<p><mark data-color=\"{v}\">x</mark><span style=\"color: {v}\">y</span></p>",
                v = value
            );
            if let Ok(first) = parse(&html) {
                let second = parse(&serialize(&first)).unwrap();
                prop_assert_eq!(second, first);
            }
        }

        #[test]
        fn plain_text_survives_serialization(
            blocks in proptest::collection::vec(text_block_strategy(), 1..5)
        ) {
            let doc = RichText::new(blocks.into_iter().map(Block::Text).collect());
            let reparsed = parse(&serialize(&doc)).unwrap();
            prop_assert_eq!(reparsed.plain_text(), doc.plain_text());
        }
    }
}
