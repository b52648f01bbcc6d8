//! Session read endpoints.

use va_core::BackendSession;

use crate::{
    BackendClient,
    error::ClientError,
    http::{check_response, decode_json},
};

impl BackendClient {
    /// Fetch the full state of one session (`GET /api/session/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, the backend returns a
    /// non-success status (404 for unknown sessions), or the body is not a
    /// session object.
    pub async fn get_session(&self, session_id: &str) -> Result<BackendSession, ClientError> {
        let url = self.api_url(&["session", session_id]);
        tracing::debug!(%url, "fetching session");
        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }

    /// List every session known to the backend (`GET /api/sessions`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails, the backend returns a
    /// non-success status, or the body is not an array of sessions.
    pub async fn list_sessions(&self) -> Result<Vec<BackendSession>, ClientError> {
        let url = self.api_url(&["sessions"]);
        let resp = check_response(self.http.get(&url).send().await?).await?;
        decode_json(resp).await
    }
}
