use std::fmt::Write as _;

use serde::Serialize;
use va_client::BackendClient;
use va_core::{AnalysisStep, Citation, Language, StepStatus};
use va_report::{AnnotatedReport, annotate, render_terminal};
use va_sync::ViewState;

use super::views::{StepRow, step_rows};
use crate::cli::{GlobalFlags, OutputFormat};
use crate::messages::{Message, run_action_label};
use crate::output::output;

/// One entry of the citation index printed under a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitationEntry {
    pub ordinal: usize,
    pub label: String,
    pub page: u32,
}

/// Where the document viewer should go, as an absolute URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerLink {
    pub file: String,
    pub url: String,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_rect: Option<[f64; 4]>,
}

impl ViewerLink {
    #[must_use]
    pub fn from_state(state: &ViewState, client: &BackendClient) -> Option<Self> {
        state.viewer_target().map(|target| Self {
            url: format!("{}#page={}", client.static_url(&target.file), target.page),
            file: target.file,
            page: target.page,
            highlight_rect: target.highlight_rect,
        })
    }
}

/// Everything shown for the selected step of a loaded session.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub session_id: String,
    pub title: String,
    pub date: String,
    pub step: AnalysisStep,
    pub status: StepStatus,
    pub steps: Vec<StepRow>,
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub citations: Vec<CitationEntry>,
    pub viewer: Option<ViewerLink>,
    #[serde(skip)]
    annotated: Option<AnnotatedReport>,
    #[serde(skip)]
    lang: Language,
}

impl StepReport {
    /// `None` when no session has been loaded yet.
    #[must_use]
    pub fn from_state(state: &ViewState, client: &BackendClient, lang: Language) -> Option<Self> {
        let session = state.session.as_ref()?;
        let annotated = state.current_result().map(annotate);
        let citations = annotated
            .as_ref()
            .map(|report| {
                report
                    .citations
                    .iter()
                    .enumerate()
                    .map(|(index, token)| CitationEntry {
                        ordinal: index + 1,
                        label: token.label.clone(),
                        page: token.citation.page,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            session_id: session.id.clone(),
            title: session.title(lang),
            date: session.display_date(),
            step: state.current_step,
            status: state.current_status(),
            steps: step_rows(session, state.current_step, lang),
            files: session.file_paths.clone(),
            result: state.current_result().map(str::to_string),
            error: state.current_error().map(str::to_string),
            citations,
            viewer: ViewerLink::from_state(state, client),
            annotated,
            lang,
        })
    }

    /// Citation `ordinal` (1-based) of the rendered report.
    #[must_use]
    pub fn citation(&self, ordinal: usize) -> Option<Citation> {
        self.annotated
            .as_ref()
            .and_then(|report| report.citation(ordinal))
            .map(|token| token.citation)
    }

    /// Session header, step sidebar, file list and run-action hint.
    #[must_use]
    pub fn render_overview(&self, current_file: Option<&str>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}  |  {}  |  {}", self.title, self.date, self.session_id);
        out.push('\n');
        for row in &self.steps {
            let marker = if row.selected { '>' } else { ' ' };
            let _ = writeln!(out, "{marker} {:<32} {}", row.label, row.status);
        }
        out.push('\n');
        if self.files.is_empty() {
            let _ = writeln!(out, "  {}", Message::NoFiles.text(self.lang));
        }
        for (index, file) in self.files.iter().enumerate() {
            let marker = if current_file == Some(file.as_str()) { '*' } else { ' ' };
            let _ = writeln!(out, "{marker} {}. {file}", index + 1);
        }
        out.push('\n');
        let _ = write!(out, "[{}]", run_action_label(self.status, self.lang));
        out
    }

    /// Step title, rendered report (or failure text), citation index and
    /// viewer link.
    #[must_use]
    pub fn render_body(&self, color: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==\n", self.step.title(self.lang));

        match (&self.annotated, &self.error) {
            (Some(report), _) => out.push_str(&render_terminal(report, color)),
            (None, Some(error)) => {
                let _ = writeln!(out, "{}: {error}", self.status.label(self.lang));
            }
            (None, None) => {
                let hint = if self.status == StepStatus::Running {
                    Message::AnalysisInProgress
                } else {
                    Message::NoReport
                };
                let _ = writeln!(out, "{}", hint.text(self.lang));
            }
        }

        if !self.citations.is_empty() {
            out.push('\n');
            for entry in &self.citations {
                let _ = writeln!(out, "  ^{:<3} {:<16} -> p.{}", entry.ordinal, entry.label, entry.page);
            }
        }
        if let Some(viewer) = &self.viewer {
            let _ = write!(out, "\n{}", viewer.url);
        }
        out.trim_end().to_string()
    }

    #[must_use]
    pub fn render_human(&self, current_file: Option<&str>, color: bool) -> String {
        format!("{}\n\n{}", self.render_overview(current_file), self.render_body(color))
    }
}

/// Print `report` as JSON/raw, or as the human view for table output.
pub fn print_report(
    report: &StepReport,
    current_file: Option<&str>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match flags.format {
        OutputFormat::Json | OutputFormat::Raw => output(report, flags.format),
        OutputFormat::Table => {
            println!("{}", report.render_human(current_file, crate::ui::prefs().report_color));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use va_core::{AnalysisSession, StepRecord};

    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> BackendClient {
        BackendClient::new("http://localhost:8001", None).unwrap()
    }

    fn state(status: StepStatus, text: Option<&str>) -> ViewState {
        let mut session = AnalysisSession::new("s-1", "2024-05-01T08:30:00");
        session.company_name = Some("Acme".into());
        session.set_file_paths(vec!["/static/knowledge/acme.pdf".into()]);
        session.set_step(StepRecord::with_output(
            AnalysisStep::Business,
            status,
            text.map(str::to_string),
        ));
        ViewState::with_session(session, AnalysisStep::Business)
    }

    #[test]
    fn no_report_without_session() {
        assert!(StepReport::from_state(&ViewState::default(), &client(), Language::En).is_none());
    }

    #[test]
    fn completed_step_indexes_citations() {
        let state = state(StepStatus::Completed, Some("Moat [Page 4-5, Page 36-37]"));
        let report = StepReport::from_state(&state, &client(), Language::En).unwrap();
        assert_eq!(report.citations.len(), 2);
        assert_eq!(report.citations[1].page, 36);
        assert_eq!(report.citation(1), Some(Citation::page(4)));
        assert!(report.citation(3).is_none());

        let body = report.render_body(false);
        assert!(body.contains("Moat [Page 4-5]^1 [Page 36-37]^2"));
        assert!(body.ends_with("http://localhost:8001/static/knowledge/acme.pdf#page=1"));
    }

    #[test]
    fn failed_step_shows_error_text() {
        let state = state(StepStatus::Failed, Some("Error: model timeout"));
        let report = StepReport::from_state(&state, &client(), Language::Zh).unwrap();
        assert!(report.result.is_none());
        assert!(report.render_body(false).contains("失败: Error: model timeout"));
        assert!(report.render_overview(None).ends_with("[开始分析]"));
    }

    #[test]
    fn running_step_shows_progress_hint() {
        let state = state(StepStatus::Running, None);
        let report = StepReport::from_state(&state, &client(), Language::En).unwrap();
        assert!(report.render_body(false).contains("Analysis in progress..."));
        assert!(report.render_overview(None).ends_with("[Analysis in progress...]"));
    }

    #[test]
    fn overview_marks_selected_file() {
        let state = state(StepStatus::Pending, None);
        let report = StepReport::from_state(&state, &client(), Language::En).unwrap();
        let overview = report.render_overview(state.current_file.as_deref());
        assert!(overview.starts_with("Acme  |  2024-05-01 08:30  |  s-1"));
        assert!(overview.contains("* 1. /static/knowledge/acme.pdf"));
        assert!(overview.contains("> 1. Business model analysis"));
    }

    #[test]
    fn viewer_link_tracks_citation() {
        let mut state = state(StepStatus::Completed, Some("x [Page 12]"));
        state.apply_citation(Citation::page(12));
        let link = ViewerLink::from_state(&state, &client()).unwrap();
        assert_eq!(link.page, 12);
        assert_eq!(link.url, "http://localhost:8001/static/knowledge/acme.pdf#page=12");
    }
}
