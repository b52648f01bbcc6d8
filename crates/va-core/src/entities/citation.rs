use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A page reference taken from report text. Never persisted; consumed by the
/// page-jump handler as soon as the user activates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Citation {
    /// 1-based page number in the source document.
    pub page: u32,
    /// Optional highlight rectangle `[x, y, width, height]`. Passed through
    /// untouched; the markdown extractor never sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<[f64; 4]>,
}

impl Citation {
    /// A citation for `page` without a highlight rectangle.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self { page, rect: None }
    }
}
