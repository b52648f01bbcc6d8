use serde::Serialize;
use va_core::{AnalysisSession, AnalysisStep, Language};

/// One line of the session list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub status: String,
}

impl SessionRow {
    #[must_use]
    pub fn from_session(session: &AnalysisSession, lang: Language) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title(lang),
            date: session.display_date(),
            status: session.list_status().label(lang).to_string(),
        }
    }
}

/// One sidebar entry of the step overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRow {
    pub step: AnalysisStep,
    pub label: String,
    pub status: String,
    pub selected: bool,
}

#[must_use]
pub fn step_rows(
    session: &AnalysisSession,
    current: AnalysisStep,
    lang: Language,
) -> Vec<StepRow> {
    session
        .steps()
        .map(|record| StepRow {
            step: record.step,
            label: record.step.sidebar_label(lang),
            status: record.status.label(lang).to_string(),
            selected: record.step == current,
        })
        .collect()
}

/// Resolve a 1-based list index or a literal value against `items`.
#[must_use]
pub fn resolve_index_or_value(raw: &str, items: &[String]) -> String {
    raw.parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| items.get(index))
        .cloned()
        .unwrap_or_else(|| raw.to_string())
}
