//! Citation marker recognition in plain text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use va_core::Citation;

/// A whole citation block: `[Page 4]`, `[[Page 4-5, Page 36-37]]`,
/// `[Source: Page 12]`, in any letter case.
static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\[?(?:Source:\s*)?Page\s*(?:[0-9\-\s,]+(?:Page)?)*\]?\]")
        .expect("citation block pattern compiles")
});

/// A single page or page range inside a block. Digits are ASCII only.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:-[0-9]+)?").expect("citation token pattern compiles"));

/// One clickable page reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationToken {
    /// Display label, e.g. `[Page 4-5]`.
    pub label: String,
    /// The raw token, e.g. `4-5`.
    pub text: String,
    /// Navigation target; ranges jump to their first page.
    pub citation: Citation,
}

/// All tokens found in one matched block, shown side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationGroup {
    /// The matched source text, e.g. `[Page 4-5, Page 36-37]`.
    pub source: String,
    pub tokens: Vec<CitationToken>,
}

impl CitationGroup {
    /// Token labels separated by a single space.
    #[must_use]
    pub fn display(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.label.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Text { text: String },
    Citations { group: CitationGroup },
}

impl Segment {
    /// Tokens carried by this segment (empty for text).
    #[must_use]
    pub fn tokens(&self) -> &[CitationToken] {
        match self {
            Self::Text { .. } => &[],
            Self::Citations { group } => &group.tokens,
        }
    }
}

/// Split `text` into plain runs and citation groups, in source order.
///
/// Text without any marker comes back as a single unchanged segment. A block
/// that matches the marker shape but yields no navigable page stays text.
#[must_use]
pub fn extract_citations(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for found in BLOCK.find_iter(text) {
        let tokens = tokens_in(found.as_str());
        if tokens.is_empty() {
            tracing::trace!(block = found.as_str(), "citation block without pages");
            continue;
        }
        push_text(&mut segments, &text[cursor..found.start()]);
        segments.push(Segment::Citations {
            group: CitationGroup {
                source: found.as_str().to_string(),
                tokens,
            },
        });
        cursor = found.end();
    }

    push_text(&mut segments, &text[cursor..]);
    if segments.is_empty() {
        segments.push(Segment::Text {
            text: String::new(),
        });
    }
    segments
}

fn tokens_in(block: &str) -> Vec<CitationToken> {
    TOKEN
        .find_iter(block)
        .filter_map(|token| {
            let raw = token.as_str();
            let start = raw.split('-').next()?;
            let page = start.parse::<u32>().ok().filter(|page| *page >= 1)?;
            Some(CitationToken {
                label: format!("[Page {raw}]"),
                text: raw.to_string(),
                citation: Citation::page(page),
            })
        })
        .collect()
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text { text: last }) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text {
            text: text.to_string(),
        });
    }
}
