use chrono::{DateTime, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AnalysisStep, Language, ListStatus, StepStatus};

/// Session exactly as the backend returns it from `GET /api/session/{id}` and
/// `GET /api/sessions`.
///
/// `file_paths_json` holds a JSON-encoded array of absolute filesystem paths;
/// it is the authoritative file list. Everything except `id` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BackendSession {
    pub id: String,
    pub created_at: Option<String>,
    pub company_name: Option<String>,
    pub file_name: Option<String>,
    pub file_paths_json: Option<String>,

    pub business_status: Option<String>,
    pub business_analysis_result: Option<String>,
    pub mda_status: Option<String>,
    pub mda_analysis_result: Option<String>,
    pub financial_status: Option<String>,
    pub financial_analysis_result: Option<String>,
    pub competitor_status: Option<String>,
    pub competitor_analysis_result: Option<String>,
    pub valuation_status: Option<String>,
    pub valuation_result: Option<String>,
}

impl BackendSession {
    /// Raw `(status, result)` columns for one step.
    #[must_use]
    pub fn step_columns(&self, step: AnalysisStep) -> (Option<&str>, Option<&str>) {
        let (status, result) = match step {
            AnalysisStep::Business => (&self.business_status, &self.business_analysis_result),
            AnalysisStep::Mda => (&self.mda_status, &self.mda_analysis_result),
            AnalysisStep::Financial => (&self.financial_status, &self.financial_analysis_result),
            AnalysisStep::Competitor => {
                (&self.competitor_status, &self.competitor_analysis_result)
            }
            AnalysisStep::Valuation => (&self.valuation_status, &self.valuation_result),
        };
        (status.as_deref(), result.as_deref())
    }
}

/// Status and output of one analysis step.
///
/// `result` is only present once the step is `COMPLETED`; `error` only once it
/// is `FAILED`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StepRecord {
    pub step: AnalysisStep,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepRecord {
    #[must_use]
    pub const fn pending(step: AnalysisStep) -> Self {
        Self {
            step,
            status: StepStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Build a record from a status and the backend's text column, routing the
    /// text to `result` or `error` according to the status.
    #[must_use]
    pub fn with_output(step: AnalysisStep, status: StepStatus, text: Option<String>) -> Self {
        let text = text.filter(|value| !value.is_empty());
        let (result, error) = match status {
            StepStatus::Completed => (text, None),
            StepStatus::Failed => (None, text),
            StepStatus::Pending | StepStatus::Running => (None, None),
        };
        Self {
            step,
            status,
            result,
            error,
        }
    }
}

/// The client's view of one analysis session. Replaced wholesale on every
/// poll; never merged field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSession {
    pub id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Browser-resolvable `/static/...` URLs, in upload order.
    pub file_paths: Vec<String>,
    /// Legacy single-file alias, always `file_paths[0]` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    steps: [StepRecord; 5],
}

impl AnalysisSession {
    /// A session with no files and every step `PENDING`.
    #[must_use]
    pub fn new(id: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            company_name: None,
            file_name: None,
            file_paths: Vec::new(),
            file_path: None,
            steps: AnalysisStep::ALL.map(StepRecord::pending),
        }
    }

    /// Replace the file list, keeping the legacy alias in sync.
    pub fn set_file_paths(&mut self, paths: Vec<String>) {
        self.file_path = paths.first().cloned();
        self.file_paths = paths;
    }

    /// Replace one step record. The record's own `step` field is authoritative.
    pub fn set_step(&mut self, record: StepRecord) {
        let index = record.step.index();
        self.steps[index] = record;
    }

    #[must_use]
    pub const fn step(&self, step: AnalysisStep) -> &StepRecord {
        &self.steps[step.index()]
    }

    pub fn steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter()
    }

    #[must_use]
    pub const fn status(&self, step: AnalysisStep) -> StepStatus {
        self.step(step).status
    }

    /// True iff `step` is currently `RUNNING` on the backend.
    #[must_use]
    pub fn is_analyzing(&self, step: AnalysisStep) -> bool {
        self.status(step) == StepStatus::Running
    }

    /// Card title: company name, then file name, then a placeholder.
    #[must_use]
    pub fn title(&self, lang: Language) -> String {
        self.company_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.file_name.as_deref().filter(|name| !name.is_empty()))
            .map_or_else(
                || match lang {
                    Language::En => "Untitled research".to_string(),
                    Language::Zh => "未命名研究".to_string(),
                },
                str::to_string,
            )
    }

    /// `YYYY-MM-DD HH:MM` when `created_at` parses, otherwise its first ten
    /// characters.
    #[must_use]
    pub fn display_date(&self) -> String {
        let raw = self.created_at.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return parsed.format("%Y-%m-%d %H:%M").to_string();
        }
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return parsed.format("%Y-%m-%d %H:%M").to_string();
        }
        raw.chars().take(10).collect()
    }

    /// Session-list status heuristic. Only a handful of steps are consulted.
    #[must_use]
    pub fn list_status(&self) -> ListStatus {
        if self.status(AnalysisStep::Valuation) == StepStatus::Completed {
            return ListStatus::Completed;
        }
        if self.is_analyzing(AnalysisStep::Business) || self.is_analyzing(AnalysisStep::Financial)
        {
            return ListStatus::Analyzing;
        }
        match self.status(AnalysisStep::Business) {
            StepStatus::Failed => ListStatus::Failed,
            StepStatus::Completed => ListStatus::InProgress,
            StepStatus::Pending | StepStatus::Running => ListStatus::Pending,
        }
    }
}
