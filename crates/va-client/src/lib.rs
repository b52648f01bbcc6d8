//! # va-client
//!
//! HTTP client for the analysis backend. Every call is a single request; no
//! retries, no caching. Endpoints:
//! - `POST /api/upload`, `POST /api/session/{id}/upload` (multipart uploads)
//! - `GET /api/session/{id}`, `GET /api/sessions`
//! - `POST /api/analyze/{id}/{step}`
//! - `DELETE /api/session/{id}/file?filename=`
//! - `GET /api/export/{id}`, `POST /api/import`

pub mod analyze;
pub mod files;
pub mod sessions;
pub mod transfer;

mod error;
mod http;

pub use analyze::AnalyzeResponse;
pub use error::ClientError;
pub use files::{ActionAck, AddFileResponse, UploadResponse};
pub use transfer::{ExportedArchive, ImportResponse};

use std::time::Duration;

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client for `base_url` (e.g. `http://localhost:8001`).
    ///
    /// `timeout` of `None` leaves requests unbounded; a hung request then only
    /// delays the poll cycle that issued it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for an empty base URL and
    /// [`ClientError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::InvalidInput(
                "backend base URL is empty".to_string(),
            ));
        }

        let mut builder =
            reqwest::Client::builder().user_agent(concat!("valan/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a `/static/...` path produced by session
    /// reconciliation. The document viewer loads files from here.
    #[must_use]
    pub fn static_url(&self, static_path: &str) -> String {
        if static_path.starts_with('/') {
            format!("{}{static_path}", self.base_url)
        } else {
            format!("{}/{static_path}", self.base_url)
        }
    }

    /// `<base>/api/<segments joined by '/'>`, each segment percent-encoded.
    fn api_url(&self, segments: &[&str]) -> String {
        let mut url = format!("{}/api", self.base_url);
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }
}

/// Final path component of a static path or file name.
#[must_use]
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        BackendClient::new("http://localhost:8001/", None).unwrap()
    }

    #[test]
    fn base_url_is_normalized() {
        assert_eq!(client().base_url(), "http://localhost:8001");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let err = BackendClient::new("  ", None).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[test]
    fn api_url_encodes_segments() {
        let url = client().api_url(&["session", "a b/c", "file"]);
        assert_eq!(url, "http://localhost:8001/api/session/a%20b%2Fc/file");
    }

    #[test]
    fn static_url_joins_paths() {
        let client = client();
        assert_eq!(
            client.static_url("/static/knowledge/a.pdf"),
            "http://localhost:8001/static/knowledge/a.pdf"
        );
        assert_eq!(
            client.static_url("static/a.pdf"),
            "http://localhost:8001/static/a.pdf"
        );
    }

    #[test]
    fn file_name_of_takes_last_segment() {
        assert_eq!(file_name_of("/static/knowledge/annual 2023.pdf"), "annual 2023.pdf");
        assert_eq!(file_name_of("plain.pdf"), "plain.pdf");
        assert_eq!(file_name_of("/static/dir/"), "");
    }

    #[tokio::test]
    #[ignore] // requires a running backend on localhost:8001
    async fn live_list_sessions() {
        let sessions = client().list_sessions().await.expect("backend reachable");
        for session in &sessions {
            println!("{} {:?}", session.id, session.created_at);
        }
    }
}
