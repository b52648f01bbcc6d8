//! Upload and file-removal endpoints.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::{
    BackendClient,
    error::ClientError,
    file_name_of,
    http::{check_response, decode_json, decode_json_or_default},
};

/// Response from `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Static path the backend suggests for the uploaded file.
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Response from `POST /api/session/{id}/upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFileResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Absolute backend paths after the addition.
    #[serde(default)]
    pub file_paths: Vec<String>,
}

/// Generic acknowledgement for endpoints whose body is informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAck {
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendClient {
    /// Create a new session from a first document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read, otherwise any
    /// transport, status or decoding error.
    pub async fn upload(&self, path: &Path) -> Result<UploadResponse, ClientError> {
        let form = Form::new().part("file", file_part(path).await?);
        let url = self.api_url(&["upload"]);
        tracing::info!(file = %path.display(), "uploading document");
        let resp = check_response(self.http.post(&url).multipart(form).send().await?).await?;
        decode_json(resp).await
    }

    /// Attach an additional document to an existing session.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the file cannot be read, otherwise any
    /// transport, status or decoding error.
    pub async fn add_file(
        &self,
        session_id: &str,
        path: &Path,
    ) -> Result<AddFileResponse, ClientError> {
        let form = Form::new().part("file", file_part(path).await?);
        let url = self.api_url(&["session", session_id, "upload"]);
        tracing::info!(session_id, file = %path.display(), "adding document to session");
        let resp = check_response(self.http.post(&url).multipart(form).send().await?).await?;
        decode_json_or_default(resp).await
    }

    /// Remove one document from a session. `file` may be a static path or a
    /// bare file name; only its last segment is sent.
    ///
    /// Local state is not touched: the next poll reflects the removal.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidInput`] for an empty file name, otherwise
    /// any transport or status error.
    pub async fn delete_file(&self, session_id: &str, file: &str) -> Result<ActionAck, ClientError> {
        let url = self.delete_file_url(session_id, file)?;
        tracing::info!(session_id, file, "deleting document from session");
        let resp = check_response(self.http.delete(&url).send().await?).await?;
        decode_json_or_default(resp).await
    }

    fn delete_file_url(&self, session_id: &str, file: &str) -> Result<String, ClientError> {
        let filename = file_name_of(file.trim());
        if filename.is_empty() {
            return Err(ClientError::InvalidInput(format!(
                "'{file}' does not name a file"
            )));
        }
        Ok(format!(
            "{}?filename={}",
            self.api_url(&["session", session_id, "file"]),
            urlencoding::encode(filename)
        ))
    }
}

/// Read `path` into a multipart part named after the file.
pub(crate) async fn file_part(path: &Path) -> Result<Part, ClientError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            ClientError::InvalidInput(format!("'{}' has no usable file name", path.display()))
        })?
        .to_string();

    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mime = mime_for(&file_name);
    Ok(Part::bytes(bytes).file_name(file_name).mime_str(mime)?)
}

fn mime_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".zip") {
        "application/zip"
    } else if lower.ends_with(".txt") || lower.ends_with(".md") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}
