//! Plain-terminal rendering of an [`AnnotatedReport`].
//!
//! Citations print as `[Page 4-5]^1`, where the number is the ordinal that
//! [`AnnotatedReport::citation`] resolves. Tokens of one group are separated
//! by a single space.

use crate::markdown::{AnnotatedReport, Container, Piece};
use crate::pattern::Segment;

const BOLD: &str = "1";
const ITALIC: &str = "3";
const DIM: &str = "2";
const CYAN: &str = "36";

/// Render `report` for a terminal. `color` enables ANSI styling.
#[must_use]
pub fn render_terminal(report: &AnnotatedReport, color: bool) -> String {
    let mut out = Out::new(color);
    for piece in &report.pieces {
        out.piece(piece);
    }
    out.finish()
}

struct Out {
    buf: String,
    color: bool,
    at_line_start: bool,
    quote_depth: usize,
    /// Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
    links: Vec<String>,
    row_cells: usize,
    next_ordinal: usize,
}

impl Out {
    const fn new(color: bool) -> Self {
        Self {
            buf: String::new(),
            color,
            at_line_start: true,
            quote_depth: 0,
            lists: Vec::new(),
            in_code_block: false,
            links: Vec::new(),
            row_cells: 0,
            next_ordinal: 1,
        }
    }

    fn piece(&mut self, piece: &Piece) {
        match piece {
            Piece::Start { container } => self.start(container),
            Piece::End { container } => self.end(container),
            Piece::Text { text } => self.text(text),
            Piece::Scanned { segments } => {
                for segment in segments {
                    self.segment(segment);
                }
            }
            Piece::Code { code } => self.write(&format!("`{code}`")),
            Piece::Html { html } => self.text(html),
            Piece::TaskMarker { checked } => self.write(if *checked { "[x] " } else { "[ ] " }),
            Piece::HardBreak => self.newline(),
            Piece::Rule => {
                self.blank_line();
                self.write("---");
                self.blank_line();
            }
        }
    }

    fn start(&mut self, container: &Container) {
        match container {
            Container::Heading { level } => {
                self.blank_line();
                let marks = "#".repeat(usize::from(*level));
                self.style_open(BOLD);
                self.write(&format!("{marks} "));
            }
            Container::BlockQuote => {
                self.ensure_line_start();
                self.quote_depth += 1;
            }
            Container::List { start } => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.ensure_line_start();
                }
                self.lists.push(*start);
            }
            Container::Item => {
                self.ensure_line_start();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}. ");
                        *next += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                let prefix = self.line_prefix(self.lists.len().saturating_sub(1));
                self.buf.push_str(&prefix);
                self.buf.push_str(&marker);
                self.at_line_start = false;
            }
            Container::CodeBlock { .. } => {
                self.blank_line();
                self.in_code_block = true;
            }
            Container::Emphasis => self.style_open(ITALIC),
            Container::Strong => self.style_open(BOLD),
            Container::Strikethrough => self.write("~~"),
            Container::Link { dest } => self.links.push(dest.clone()),
            Container::Image { dest } => self.write(&format!("[image: {dest}] ")),
            Container::Table => self.blank_line(),
            Container::TableRow | Container::TableHead => {
                self.ensure_line_start();
                self.row_cells = 0;
            }
            Container::TableCell => {
                if self.row_cells > 0 {
                    self.write(" | ");
                }
                self.row_cells += 1;
            }
            Container::Paragraph | Container::Other => {
                if self.lists.is_empty() {
                    self.ensure_line_start();
                }
            }
        }
    }

    fn end(&mut self, container: &Container) {
        match container {
            Container::Heading { .. } => {
                self.style_close();
                self.blank_line();
            }
            Container::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.newline();
                }
            }
            Container::BlockQuote => {
                self.ensure_line_start();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            Container::List { .. } => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            Container::Item | Container::TableRow | Container::TableHead => self.ensure_line_start(),
            Container::CodeBlock { .. } => {
                self.in_code_block = false;
                self.blank_line();
            }
            Container::Emphasis | Container::Strong => self.style_close(),
            Container::Strikethrough => self.write("~~"),
            Container::Link { .. } => {
                if let Some(dest) = self.links.pop() {
                    self.write(&format!(" ({dest})"));
                }
            }
            Container::Table => self.blank_line(),
            Container::Image { .. } | Container::TableCell | Container::Other => {}
        }
    }

    fn segment(&mut self, segment: &Segment) {
        match segment {
            Segment::Text { text } => self.text(text),
            Segment::Citations { group } => {
                for (index, token) in group.tokens.iter().enumerate() {
                    if index > 0 {
                        self.write(" ");
                    }
                    let ordinal = self.next_ordinal;
                    self.next_ordinal += 1;
                    self.styled(CYAN, &token.label);
                    self.styled(DIM, &format!("^{ordinal}"));
                }
            }
        }
    }

    /// Write text that may contain newlines.
    fn text(&mut self, text: &str) {
        let mut lines = text.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                self.write(line);
            }
            if lines.peek().is_some() {
                self.newline();
            }
        }
    }

    /// Write a fragment without newlines, prefixing it at line start.
    fn write(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if self.at_line_start {
            self.at_line_start = false;
            let prefix = self.line_prefix(self.lists.len());
            self.buf.push_str(&prefix);
        }
        self.buf.push_str(fragment);
    }

    /// Quote markers, list indentation and code indentation for a new line.
    fn line_prefix(&self, list_depth: usize) -> String {
        let mut prefix = "> ".repeat(self.quote_depth);
        prefix.push_str(&"  ".repeat(list_depth));
        if self.in_code_block {
            prefix.push_str("    ");
        }
        prefix
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        self.at_line_start = true;
    }

    fn ensure_line_start(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
    }

    /// Ensure the output ends with an empty line (or is empty).
    fn blank_line(&mut self) {
        self.ensure_line_start();
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    fn styled(&mut self, code: &str, text: &str) {
        if self.color {
            self.write(&format!("\u{1b}[{code}m{text}\u{1b}[0m"));
        } else {
            self.write(text);
        }
    }

    fn style_open(&mut self, code: &str) {
        if self.color {
            self.write(&format!("\u{1b}[{code}m"));
        }
    }

    fn style_close(&mut self) {
        if self.color {
            self.buf.push_str("\u{1b}[0m");
        }
    }

    fn finish(self) -> String {
        let trimmed = self.buf.trim_end();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}\n")
        }
    }
}
