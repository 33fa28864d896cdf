//! `reqwest`-backed [`Transport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::transport::{ApiRequest, FormPart, FormValue, Method, RequestBody, Transport, TransportError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Scribe REST API
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport with the default request timeout
    pub fn new(base_url: &str) -> SyncResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);

        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(parts) => builder.multipart(to_multipart(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("Reading response failed: {}", e)))?;

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            let message = error_message(&value, status);
            warn!(method = %request.method, url = %url, status = status.as_u16(), error = %message, "Request failed");
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(method = %request.method, url = %url, status = status.as_u16(), "Request succeeded");
        Ok(value)
    }
}

fn to_multipart(parts: Vec<FormPart>) -> Result<Form, TransportError> {
    let mut form = Form::new();

    for part in parts {
        form = match part.value {
            FormValue::Text(text) => form.text(part.name, text),
            FormValue::File(file) => {
                let file_part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| TransportError::InvalidRequest(format!("Invalid MIME type: {}", e)))?;
                form.part(part.name, file_part)
            }
        };
    }

    Ok(form)
}

/// Server error text, taken from the `error` or `message` field
fn error_message(value: &Value, status: StatusCode) -> String {
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .or_else(|| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
