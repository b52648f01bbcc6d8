//! Step, status and language enums.
//!
//! `AnalysisStep` serializes as the lowercase identifier used in backend
//! routes (`/api/analyze/{id}/{step}`). `StepStatus` serializes the way the
//! backend stores it (`PENDING`, `RUNNING`, ...).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language used for user-facing labels and messages.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "zh" | "zh-cn" | "cn" | "chinese" => Ok(Self::Zh),
            _ => Err(CoreError::UnknownLanguage(raw.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisStep
// ---------------------------------------------------------------------------

/// One of the five fixed analysis categories. Steps are independent: any of
/// them may run before the others.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStep {
    #[default]
    Business,
    Mda,
    Financial,
    Competitor,
    Valuation,
}

impl AnalysisStep {
    /// All steps in sidebar order.
    pub const ALL: [Self; 5] = [
        Self::Business,
        Self::Mda,
        Self::Financial,
        Self::Competitor,
        Self::Valuation,
    ];

    /// Route identifier, e.g. `business`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Mda => "mda",
            Self::Financial => "financial",
            Self::Competitor => "competitor",
            Self::Valuation => "valuation",
        }
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Business => 0,
            Self::Mda => 1,
            Self::Financial => 2,
            Self::Competitor => 3,
            Self::Valuation => 4,
        }
    }

    /// Panel title for this step.
    #[must_use]
    pub const fn title(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Business, Language::En) => "Business model analysis",
            (Self::Mda, Language::En) => "MD&A risk analysis",
            (Self::Financial, Language::En) => "Financial statement analysis",
            (Self::Competitor, Language::En) => "Competitor analysis",
            (Self::Valuation, Language::En) => "Valuation modeling",
            (Self::Business, Language::Zh) => "商业模式分析",
            (Self::Mda, Language::Zh) => "MD&A 风险分析",
            (Self::Financial, Language::Zh) => "财务报表分析",
            (Self::Competitor, Language::Zh) => "竞争对手分析",
            (Self::Valuation, Language::Zh) => "估值建模",
        }
    }

    /// Numbered sidebar label, e.g. `1. Business model analysis`.
    #[must_use]
    pub fn sidebar_label(self, lang: Language) -> String {
        format!("{}. {}", self.index() + 1, self.title(lang))
    }
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStep {
    type Err = CoreError;

    /// Accepts the route identifier (case-insensitive) or the 1-based sidebar
    /// position.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let step = match normalized.as_str() {
            "business" | "1" => Self::Business,
            "mda" | "md&a" | "2" => Self::Mda,
            "financial" | "3" => Self::Financial,
            "competitor" | "4" => Self::Competitor,
            "valuation" | "5" => Self::Valuation,
            _ => return Err(CoreError::UnknownStep(raw.to_string())),
        };
        Ok(step)
    }
}

// ---------------------------------------------------------------------------
// StepStatus
// ---------------------------------------------------------------------------

/// Backend-reported status of one analysis step.
///
/// ```text
/// PENDING → RUNNING → COMPLETED
///                   → FAILED
/// ```
///
/// The client never enforces transitions; it displays whatever the backend
/// last reported.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Parse a backend status column. Returns `None` for unrecognized values.
    #[must_use]
    pub fn from_backend(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "RUNNING" => Some(Self::Running),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the step has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    pub const fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Pending, Language::En) => "pending",
            (Self::Running, Language::En) => "running",
            (Self::Completed, Language::En) => "completed",
            (Self::Failed, Language::En) => "failed",
            (Self::Pending, Language::Zh) => "待处理",
            (Self::Running, Language::Zh) => "分析中",
            (Self::Completed, Language::Zh) => "已完成",
            (Self::Failed, Language::Zh) => "失败",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ListStatus
// ---------------------------------------------------------------------------

/// Coarse status shown on a session card in the session list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Completed,
    Analyzing,
    Failed,
    InProgress,
    Pending,
}

impl ListStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Analyzing => "analyzing",
            Self::Failed => "failed",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
        }
    }

    #[must_use]
    pub const fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Self::Completed, Language::En) => "completed",
            (Self::Analyzing, Language::En) => "analyzing",
            (Self::Failed, Language::En) => "failed",
            (Self::InProgress, Language::En) => "in progress",
            (Self::Pending, Language::En) => "pending",
            (Self::Completed, Language::Zh) => "已完成",
            (Self::Analyzing, Language::Zh) => "分析中",
            (Self::Failed, Language::Zh) => "失败",
            (Self::InProgress, Language::Zh) => "进行中",
            (Self::Pending, Language::Zh) => "待处理",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(step_business, AnalysisStep, AnalysisStep::Business, "business");
    test_serde_roundtrip!(step_mda, AnalysisStep, AnalysisStep::Mda, "mda");
    test_serde_roundtrip!(status_running, StepStatus, StepStatus::Running, "RUNNING");
    test_serde_roundtrip!(status_failed, StepStatus, StepStatus::Failed, "FAILED");
    test_serde_roundtrip!(
        list_in_progress,
        ListStatus,
        ListStatus::InProgress,
        "in_progress"
    );
    test_serde_roundtrip!(lang_zh, Language, Language::Zh, "zh");

    #[test]
    fn step_indices_follow_sidebar_order() {
        for (position, step) in AnalysisStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), position);
        }
    }

    #[test]
    fn step_parses_identifier_and_position() {
        assert_eq!("Valuation".parse::<AnalysisStep>().unwrap(), AnalysisStep::Valuation);
        assert_eq!("2".parse::<AnalysisStep>().unwrap(), AnalysisStep::Mda);
        assert_eq!(" md&a ".parse::<AnalysisStep>().unwrap(), AnalysisStep::Mda);
    }

    #[test]
    fn step_rejects_upload_pseudo_step() {
        let err = "upload".parse::<AnalysisStep>().unwrap_err();
        assert!(err.to_string().contains("unknown analysis step 'upload'"));
    }

    #[test]
    fn backend_status_is_case_insensitive() {
        assert_eq!(StepStatus::from_backend("completed"), Some(StepStatus::Completed));
        assert_eq!(StepStatus::from_backend(" RUNNING "), Some(StepStatus::Running));
        assert_eq!(StepStatus::from_backend("QUEUED"), None);
    }

    #[test]
    fn sidebar_label_is_numbered() {
        assert_eq!(
            AnalysisStep::Financial.sidebar_label(Language::Zh),
            "3. 财务报表分析"
        );
    }

    #[test]
    fn language_parses_aliases() {
        assert_eq!("zh-CN".parse::<Language>().unwrap(), Language::Zh);
        assert!("fr".parse::<Language>().is_err());
    }
}
