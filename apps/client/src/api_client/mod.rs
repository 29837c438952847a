//! API Client — the single point of entry for all calls to the grant service.
//!
//! No other module builds HTTP requests. Controllers talk to the service
//! through the `GrantService` trait so tests can substitute a fake.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_DISPOSITION, Client, Response};
use serde::Serialize;
use tracing::debug;

use crate::errors::ClientError;
use crate::models::{GenerateResponse, GenerationRequest, StatusResponse};

#[cfg(test)]
pub mod fake;

const GENERATE_PATH: &str = "/api/generate-grant";
const STATUS_PATH: &str = "/api/get-grant-status";
const SAVE_PATH: &str = "/api/save-grant";

/// Filename used when the service does not name the attachment.
pub const DEFAULT_DOCUMENT_NAME: &str = "grant_application.docx";

/// A rendered document returned by the export endpoint.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub bytes: Bytes,
}

/// The operations the client needs from the grant service.
#[async_trait]
pub trait GrantService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, ClientError>;

    async fn status(&self) -> Result<StatusResponse, ClientError>;

    /// `content` is wrapped as `{"content": …}` on the wire.
    async fn save(&self, content: &serde_json::Value) -> Result<Document, ClientError>;
}

#[derive(Debug, Serialize)]
struct SaveRequest<'a> {
    content: &'a serde_json::Value,
}

/// reqwest-backed implementation of `GrantService`.
#[derive(Clone)]
pub struct GrantApiClient {
    client: Client,
    base_url: String,
}

impl GrantApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl GrantService for GrantApiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, ClientError> {
        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .json(request)
            .send()
            .await?;

        debug!("generate-grant returned {}", response.status());
        // Error statuses still carry a JSON body with a message worth showing.
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn status(&self) -> Result<StatusResponse, ClientError> {
        let response = self.client.get(self.url(STATUS_PATH)).send().await?;

        debug!("get-grant-status returned {}", response.status());
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn save(&self, content: &serde_json::Value) -> Result<Document, ClientError> {
        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .json(&SaveRequest { content })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let filename = attachment_filename(&response)
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
        let bytes = response.bytes().await?;

        debug!("save-grant returned {} bytes as {filename}", bytes.len());
        Ok(Document { filename, bytes })
    }
}

fn attachment_filename(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_disposition)
}

/// Extracts a safe bare filename from a `Content-Disposition` header value.
fn parse_content_disposition(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"').to_string())
    })?;

    // Never let the server pick a directory.
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
