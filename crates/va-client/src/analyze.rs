//! Analysis trigger endpoint.

use serde::{Deserialize, Serialize};
use va_core::AnalysisStep;

use crate::{
    BackendClient,
    error::ClientError,
    http::{check_response, decode_json_or_default},
};

/// Response from `POST /api/analyze/{id}/{step}`.
///
/// `status` is `PENDING` when a job was queued and `RUNNING` when one was
/// already in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AnalyzeResponse {
    /// Whether the backend reported the step as already running.
    #[must_use]
    pub fn already_running(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("RUNNING"))
    }
}

impl BackendClient {
    /// Trigger asynchronous analysis of one step. Completion is observed by
    /// polling the session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the backend rejects it
    /// (404 unknown session, 400 session without files).
    pub async fn analyze(
        &self,
        session_id: &str,
        step: AnalysisStep,
    ) -> Result<AnalyzeResponse, ClientError> {
        let url = self.api_url(&["analyze", session_id, step.as_str()]);
        tracing::info!(session_id, %step, "triggering analysis");
        let resp = check_response(self.http.post(&url).send().await?).await?;
        decode_json_or_default(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pending_response() {
        let resp: AnalyzeResponse =
            serde_json::from_str(r#"{"status":"PENDING","message":"商业模式分析已启动"}"#).unwrap();
        assert!(!resp.already_running());
    }

    #[test]
    fn parse_already_running_response() {
        let resp: AnalyzeResponse =
            serde_json::from_str(r#"{"status":"RUNNING","message":"分析正在进行中"}"#).unwrap();
        assert!(resp.already_running());
    }

    #[test]
    fn analyze_url_uses_step_identifier() {
        let client = BackendClient::new("http://localhost:8001", None).unwrap();
        assert_eq!(
            client.api_url(&["analyze", "s1", AnalysisStep::Competitor.as_str()]),
            "http://localhost:8001/api/analyze/s1/competitor"
        );
    }
}
