use va_core::{AnalysisSession, AnalysisStep, BackendSession, StepRecord, StepStatus};

const UPLOADS_MARKER: &str = "/uploads/";

/// Convert the backend's wire session into the client view.
///
/// Never fails: a missing or malformed `file_paths_json` yields an empty file
/// list and unknown status strings read as `PENDING`.
#[must_use]
pub fn reconcile(raw: BackendSession) -> AnalysisSession {
    let file_paths = parse_file_paths(raw.file_paths_json.as_deref())
        .iter()
        .map(|path| to_static_path(path))
        .collect();

    let created_at = raw.created_at.clone().unwrap_or_default();
    let mut session = AnalysisSession::new(raw.id.clone(), created_at);
    session.company_name.clone_from(&raw.company_name);
    session.file_name.clone_from(&raw.file_name);
    session.set_file_paths(file_paths);

    for step in AnalysisStep::ALL {
        let (status, result) = raw.step_columns(step);
        let status = status.map_or(StepStatus::Pending, |value| {
            StepStatus::from_backend(value).unwrap_or_else(|| {
                tracing::debug!(session_id = %raw.id, %step, value, "unknown step status");
                StepStatus::Pending
            })
        });
        session.set_step(StepRecord::with_output(step, status, result.map(str::to_string)));
    }

    session
}

fn parse_file_paths(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(paths) => paths,
        Err(error) => {
            tracing::debug!(%error, "ignoring malformed file_paths_json");
            Vec::new()
        }
    }
}

/// Map an absolute backend path to a browser-resolvable `/static/...` URL.
///
/// Everything after the first `/uploads/` is kept; paths outside the uploads
/// tree fall back to their final segment.
#[must_use]
pub fn to_static_path(absolute: &str) -> String {
    if let Some(index) = absolute.find(UPLOADS_MARKER) {
        return format!("/static/{}", &absolute[index + UPLOADS_MARKER.len()..]);
    }
    let file_name = absolute.rsplit('/').next().unwrap_or(absolute);
    format!("/static/{file_name}")
}

/// Local stand-in shown right after an upload, before the first poll lands.
#[must_use]
pub fn optimistic_session(session_id: &str, file_name: &str) -> AnalysisSession {
    let mut session = AnalysisSession::new(session_id, chrono::Utc::now().to_rfc3339());
    session.file_name = Some(file_name.to_string());
    session.set_file_paths(vec![format!("/static/{file_name}")]);
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn raw(file_paths_json: Option<&str>) -> BackendSession {
        BackendSession {
            id: "s-1".into(),
            created_at: Some("2024-05-01T08:30:00".into()),
            file_paths_json: file_paths_json.map(str::to_string),
            ..BackendSession::default()
        }
    }

    #[rstest]
    #[case(
        "/srv/analyst/uploads/knowledge/report.pdf",
        "/static/knowledge/report.pdf"
    )]
    #[case("/data/uploads/a/uploads/b.pdf", "/static/a/uploads/b.pdf")]
    #[case("/tmp/elsewhere/report.pdf", "/static/report.pdf")]
    #[case("report.pdf", "/static/report.pdf")]
    fn static_path_rewrite(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_static_path(input), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("not json"))]
    #[case(Some(r#"{"a": 1}"#))]
    #[case(Some("[1, 2]"))]
    #[case(Some("[\"/uploads/a.pdf\""))]
    fn malformed_file_list_is_empty(#[case] json: Option<&str>) {
        let session = reconcile(raw(json));
        assert!(session.file_paths.is_empty());
        assert!(session.file_path.is_none());
    }

    #[test]
    fn files_keep_upload_order() {
        let session = reconcile(raw(Some(
            r#"["/srv/uploads/knowledge/b.pdf", "/srv/uploads/knowledge/a.pdf"]"#,
        )));
        assert_eq!(
            session.file_paths,
            vec!["/static/knowledge/b.pdf", "/static/knowledge/a.pdf"]
        );
        assert_eq!(session.file_path.as_deref(), Some("/static/knowledge/b.pdf"));
    }

    #[test]
    fn step_columns_map_to_records() {
        let mut wire = raw(None);
        wire.business_status = Some("RUNNING".into());
        wire.mda_status = Some("COMPLETED".into());
        wire.mda_analysis_result = Some("## Risks [Page 3]".into());
        wire.valuation_status = Some("FAILED".into());
        wire.valuation_result = Some("Error: no data".into());
        wire.financial_status = Some("QUEUED".into());

        let session = reconcile(wire);
        assert!(session.is_analyzing(AnalysisStep::Business));
        for step in AnalysisStep::ALL.into_iter().skip(1) {
            assert!(!session.is_analyzing(step));
        }
        assert_eq!(
            session.step(AnalysisStep::Mda).result.as_deref(),
            Some("## Risks [Page 3]")
        );
        assert_eq!(
            session.step(AnalysisStep::Valuation).error.as_deref(),
            Some("Error: no data")
        );
        assert!(session.step(AnalysisStep::Valuation).result.is_none());
        assert_eq!(session.status(AnalysisStep::Financial), StepStatus::Pending);
        assert_eq!(session.status(AnalysisStep::Competitor), StepStatus::Pending);
    }

    #[test]
    fn metadata_is_carried_over() {
        let mut wire = raw(None);
        wire.company_name = Some("Acme".into());
        wire.file_name = Some("acme.pdf".into());
        let session = reconcile(wire);
        assert_eq!(session.id, "s-1");
        assert_eq!(session.created_at, "2024-05-01T08:30:00");
        assert_eq!(session.company_name.as_deref(), Some("Acme"));
        assert_eq!(session.file_name.as_deref(), Some("acme.pdf"));
    }

    #[test]
    fn optimistic_session_points_at_uploaded_file() {
        let session = optimistic_session("new-id", "annual report.pdf");
        assert_eq!(session.id, "new-id");
        assert_eq!(session.file_paths, vec!["/static/annual report.pdf"]);
        assert_eq!(session.file_path.as_deref(), Some("/static/annual report.pdf"));
        assert!(session.steps().all(|record| record.status == StepStatus::Pending));
        assert!(!session.created_at.is_empty());
    }
}
