//! Session export/import endpoints.

use std::path::Path;

use reqwest::multipart::Form;
use serde::{Deserialize, Serialize};

use crate::{
    BackendClient,
    error::ClientError,
    files::file_part,
    http::{check_response, decode_json},
};

/// Zip archive produced by `GET /api/export/{id}`.
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    /// File name suggested by `Content-Disposition`, if any.
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Response from `POST /api/import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendClient {
    /// Download a session backup (session JSON plus its files) as a zip.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or the session is unknown.
    pub async fn export_session(&self, session_id: &str) -> Result<ExportedArchive, ClientError> {
        let url = self.api_url(&["export", session_id]);
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let file_name = resp
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_file_name);
        let bytes = resp.bytes().await?.to_vec();
        tracing::debug!(session_id, size = bytes.len(), "exported session archive");
        Ok(ExportedArchive { file_name, bytes })
    }

    /// Restore a session from a backup zip.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the archive cannot be read, otherwise
    /// any transport, status or decoding error.
    pub async fn import_session(&self, archive: &Path) -> Result<ImportResponse, ClientError> {
        let form = Form::new().part("file", file_part(archive).await?);
        let url = self.api_url(&["import"]);
        let resp = check_response(self.http.post(&url).multipart(form).send().await?).await?;
        decode_json(resp).await
    }
}

/// Pull `filename=` out of a `Content-Disposition` header value.
fn disposition_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_plain_filename() {
        assert_eq!(
            disposition_file_name("attachment; filename=value-analyst-Acme-0f8c2a5e.zip")
                .as_deref(),
            Some("value-analyst-Acme-0f8c2a5e.zip")
        );
    }

    #[test]
    fn disposition_quoted_filename() {
        assert_eq!(
            disposition_file_name(r#"attachment; filename="backup.zip""#).as_deref(),
            Some("backup.zip")
        );
    }

    #[test]
    fn disposition_without_filename() {
        assert!(disposition_file_name("inline").is_none());
        assert!(disposition_file_name("attachment; filename=").is_none());
    }

    #[test]
    fn parse_import_response() {
        let resp: ImportResponse =
            serde_json::from_str(r#"{"session_id":"abc","message":"导入成功"}"#).unwrap();
        assert_eq!(resp.session_id, "abc");
    }
}
