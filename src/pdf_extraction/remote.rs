//! Remote extraction over HTTP.
//!
//! The document is uploaded as `multipart/form-data` (field `file`) to the
//! configured endpoint. A successful response is JSON `{"text": "..."}`;
//! failures carry `{"error": "<code>", "message": "..."}`.

use reqwest::{multipart, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{require_text, ExtractError, ExtractionMethod, TextExtractor};
use crate::file_picker::PickedFile;
use crate::types::ErrorKind;

/// Default timeout for extraction requests
const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP extraction client
#[derive(Clone)]
pub struct RemoteExtractor {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RemoteExtractor {
    pub fn new(config: &RemoteConfig) -> Result<Self, ExtractError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| ExtractError::new(ErrorKind::BackendUnavailable, "no remote endpoint configured"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("readerchunks/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExtractError::new(ErrorKind::BackendUnavailable, e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextExtractor for RemoteExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Remote
    }

    async fn extract(&self, file: &PickedFile) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(file.local_path())
            .await
            .map_err(|e| ExtractError::from_io(&e))?;
        log::debug!("remote: uploading {} ({} bytes) to {}", file.name, bytes.len(), self.endpoint);

        let part = multipart::Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str("application/pdf")
            .map_err(|e| ExtractError::new(ErrorKind::Unknown, e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|e| classify_transport_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error_response(status, &body));
        }

        let parsed: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::new(ErrorKind::Unknown, format!("malformed response: {}", e)))?;
        require_text(parsed.text)
    }
}

fn classify_transport_error(err: &reqwest::Error) -> ExtractError {
    let kind = if err.is_connect() || err.is_timeout() || err.is_request() {
        ErrorKind::BackendUnavailable
    } else {
        ErrorKind::Unknown
    };
    ExtractError::new(kind, err.to_string())
}

/// Map a non-success response to an error kind. The body's error code wins
/// over the status when it is recognised.
pub fn classify_error_response(status: StatusCode, body: &str) -> ExtractError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let by_code = match parsed.error.as_str() {
        "file_not_found" => Some(ErrorKind::FileNotFound),
        "encrypted_document" | "password_protected" => Some(ErrorKind::EncryptedDocument),
        "no_text" | "image_only" => Some(ErrorKind::NoExtractableText),
        "service_unavailable" => Some(ErrorKind::BackendUnavailable),
        _ => None,
    };
    let kind = by_code.unwrap_or_else(|| match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            ErrorKind::BackendUnavailable
        }
        s if s.is_server_error() => ErrorKind::BackendUnavailable,
        _ => ErrorKind::Unknown,
    });
    let detail = parsed
        .message
        .unwrap_or_else(|| format!("status {}: {}", status.as_u16(), body.chars().take(200).collect::<String>()));
    ExtractError::new(kind, detail)
}
