//! Cross-cutting error types for the Value Analyst client.
//!
//! Transport errors live in `va-client`, configuration errors in `va-config`.
//! The binary folds everything into `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A step identifier did not name one of the five analysis steps.
    #[error("unknown analysis step '{0}' (expected business, mda, financial, competitor or valuation)")]
    UnknownStep(String),

    /// A language code is not supported.
    #[error("unsupported language '{0}' (expected en or zh)")]
    UnknownLanguage(String),
}
