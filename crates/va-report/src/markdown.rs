//! Markdown walk that applies citation extraction to eligible text.
//!
//! Only text whose immediate parent is a paragraph, list item, heading or
//! block quote is scanned. Text inside emphasis, links, code, table cells and
//! any other element is passed through untouched.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde::Serialize;

use crate::pattern::{CitationToken, Segment, extract_citations};

/// Markdown element that encloses other pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Container {
    Paragraph,
    Heading { level: u8 },
    BlockQuote,
    /// `start` is set for ordered lists.
    List { start: Option<u64> },
    Item,
    CodeBlock { lang: Option<String> },
    Emphasis,
    Strong,
    Strikethrough,
    Link { dest: String },
    Image { dest: String },
    Table,
    TableHead,
    TableRow,
    TableCell,
    Other,
}

impl Container {
    fn from_tag(tag: &Tag<'_>) -> Self {
        match tag {
            Tag::Paragraph => Self::Paragraph,
            Tag::Heading { level, .. } => Self::Heading {
                level: *level as u8,
            },
            Tag::BlockQuote(_) => Self::BlockQuote,
            Tag::List(start) => Self::List { start: *start },
            Tag::Item => Self::Item,
            Tag::CodeBlock(kind) => Self::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                },
            },
            Tag::Emphasis => Self::Emphasis,
            Tag::Strong => Self::Strong,
            Tag::Strikethrough => Self::Strikethrough,
            Tag::Link { dest_url, .. } => Self::Link {
                dest: dest_url.to_string(),
            },
            Tag::Image { dest_url, .. } => Self::Image {
                dest: dest_url.to_string(),
            },
            Tag::Table(_) => Self::Table,
            Tag::TableHead => Self::TableHead,
            Tag::TableRow => Self::TableRow,
            Tag::TableCell => Self::TableCell,
            _ => Self::Other,
        }
    }

    /// Whether text directly inside this element is scanned for citations.
    #[must_use]
    pub const fn scans_text(&self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Item | Self::Heading { .. } | Self::BlockQuote
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Piece {
    Start { container: Container },
    End { container: Container },
    /// Text that was not eligible for scanning.
    Text { text: String },
    /// Scanned text split into runs and citation groups.
    Scanned { segments: Vec<Segment> },
    Code { code: String },
    Html { html: String },
    TaskMarker { checked: bool },
    HardBreak,
    Rule,
}

/// A report ready for display, with every clickable citation indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotatedReport {
    pub pieces: Vec<Piece>,
    /// All tokens in document order; ordinal `n` is `citations[n - 1]`.
    pub citations: Vec<CitationToken>,
}

impl AnnotatedReport {
    /// Look up a citation by its 1-based ordinal.
    #[must_use]
    pub fn citation(&self, ordinal: usize) -> Option<&CitationToken> {
        ordinal
            .checked_sub(1)
            .and_then(|index| self.citations.get(index))
    }
}

/// Parse `markdown` and annotate eligible text with citation groups.
#[must_use]
pub fn annotate(markdown: &str) -> AnnotatedReport {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut walker = Walker::default();
    for event in Parser::new_ext(markdown, options) {
        walker.handle(event);
    }
    walker.finish()
}

#[derive(Default)]
struct Walker {
    stack: Vec<Container>,
    pending: String,
    report: AnnotatedReport,
}

impl Walker {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Text(text) => self.pending.push_str(&text),
            Event::SoftBreak => self.pending.push('\n'),
            Event::Start(tag) => {
                self.flush();
                let container = Container::from_tag(&tag);
                self.stack.push(container.clone());
                self.report.pieces.push(Piece::Start { container });
            }
            Event::End(_) => {
                self.flush();
                let container = self.stack.pop().unwrap_or(Container::Other);
                self.report.pieces.push(Piece::End { container });
            }
            Event::Code(code) => {
                self.flush();
                self.report.pieces.push(Piece::Code {
                    code: code.to_string(),
                });
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.flush();
                self.report.pieces.push(Piece::Html {
                    html: html.to_string(),
                });
            }
            Event::FootnoteReference(label) => {
                self.flush();
                self.report.pieces.push(Piece::Text {
                    text: format!("[^{label}]"),
                });
            }
            Event::TaskListMarker(checked) => {
                self.flush();
                self.report.pieces.push(Piece::TaskMarker { checked });
            }
            Event::HardBreak => {
                self.flush();
                self.report.pieces.push(Piece::HardBreak);
            }
            Event::Rule => {
                self.flush();
                self.report.pieces.push(Piece::Rule);
            }
            _ => self.flush(),
        }
    }

    /// Emit the coalesced text run, scanning it if its parent allows.
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let scan = self.stack.last().is_some_and(Container::scans_text);
        if scan {
            let segments = extract_citations(&text);
            for segment in &segments {
                self.report.citations.extend_from_slice(segment.tokens());
            }
            self.report.pieces.push(Piece::Scanned { segments });
        } else {
            self.report.pieces.push(Piece::Text { text });
        }
    }

    fn finish(mut self) -> AnnotatedReport {
        self.flush();
        tracing::debug!(
            pieces = self.report.pieces.len(),
            citations = self.report.citations.len(),
            "annotated report"
        );
        self.report
    }
}
