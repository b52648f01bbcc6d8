//! # va-report
//!
//! Turns analysis-report markdown into something a terminal can show and a
//! user can navigate:
//!
//! - [`extract_citations`] splits plain text into text runs and clickable
//!   page-citation groups (`[Page 4-5, Page 36-37]`).
//! - [`annotate`] walks the markdown with `pulldown-cmark` and applies the
//!   extractor to text that sits directly in paragraphs, list items, headings
//!   and block quotes.
//! - [`render_terminal`] prints the annotated report with numbered citation
//!   markers that the CLI resolves back to [`va_core::Citation`]s.
//!
//! Nothing here fails: text that does not look like a citation is passed
//! through unchanged.

pub mod markdown;
pub mod pattern;
pub mod render;

pub use markdown::{AnnotatedReport, Container, Piece, annotate};
pub use pattern::{CitationGroup, CitationToken, Segment, extract_citations};
pub use render::render_terminal;
