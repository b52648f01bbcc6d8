//! Shared HTTP response helpers.
//!
//! Centralizes status-code checks (non-success → [`ClientError::Api`] with the
//! backend's `detail` message) and JSON decoding (→ [`ClientError::Parse`]) so
//! the endpoint modules stay focused on request construction.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status,
            message: error_message(&body),
        });
    }
    Ok(resp)
}

/// Decode a successful response body as JSON.
pub async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let body = resp.text().await?;
    parse_body(&body)
}

/// Decode a successful response body as JSON, treating an empty body as
/// `T::default()`.
pub async fn decode_json_or_default<T>(resp: reqwest::Response) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    let body = resp.text().await?;
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|error| {
        let preview: String = body.chars().take(120).collect();
        ClientError::Parse(format!("{error} (body starts with: {preview:?})"))
    })
}

/// Extract FastAPI-style `{"detail": "..."}` messages, falling back to the raw
/// body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str().map(str::to_string)))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[derive(Debug, Default, serde::Deserialize)]
    struct Ack {
        message: Option<String>,
    }

    #[tokio::test]
    async fn check_response_success() {
        let resp = mock_response(200, "{}");
        assert!(check_response(resp).await.is_ok());
    }

    #[tokio::test]
    async fn check_response_surfaces_detail() {
        let resp = mock_response(404, r#"{"detail":"会话未找到"}"#);
        let err = check_response(resp).await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "会话未找到");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn check_response_falls_back_to_raw_body() {
        let resp = mock_response(502, "Bad Gateway\n");
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 502, ref message } if message == "Bad Gateway"));
    }

    #[tokio::test]
    async fn structured_detail_keeps_raw_json() {
        let body = r#"{"detail":[{"loc":["body","file"],"msg":"field required"}]}"#;
        let err = check_response(mock_response(422, body)).await.unwrap_err();
        assert!(err.to_string().contains("field required"));
    }

    #[tokio::test]
    async fn decode_json_reports_parse_errors() {
        let err = decode_json::<Ack>(mock_response(200, "<html>oops</html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
        assert!(err.to_string().contains("<html>oops"));
    }

    #[tokio::test]
    async fn empty_body_decodes_to_default() {
        let ack: Ack = decode_json_or_default(mock_response(200, "  ")).await.unwrap();
        assert!(ack.message.is_none());
    }
}
