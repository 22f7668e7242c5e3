use crate::document::{Document, Stats};
use crate::error::{ClientError, Result};
use crate::request::SearchRequest;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// The remote engine's HTTP contract.
///
/// Single-threaded by design, so futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait SearchApi {
    /// `GET /stats`
    async fn stats(&self) -> Result<Stats>;

    /// `POST /search`; documents in engine order
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>>;

    /// `GET /document/{id}`
    async fn document(&self, id: &str) -> Result<Document>;

    /// Base URL used in user-facing messages
    fn base_url(&self) -> &str;
}

// ========== reqwest implementation ==========

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client; `timeout` of `None` keeps the transport default
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("searchfront/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Connectivity(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: normalize_base_url(base_url),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait(?Send)]
impl SearchApi for ApiClient {
    async fn stats(&self) -> Result<Stats> {
        let url = self.url("/stats");
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        decode(check_status(resp).await?).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>> {
        let url = self.url("/search");
        tracing::debug!("POST {} query={:?}", url, request.query());
        let resp = self.client.post(url).json(&request.body()).send().await?;
        decode(check_status(resp).await?).await
    }

    async fn document(&self, id: &str) -> Result<Document> {
        let url = self.url(&format!("/document/{}", urlencoding::encode(id)));
        tracing::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id.to_string()));
        }
        decode(check_status(resp).await?).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    tracing::warn!("API responded with {}: {}", status, body.trim());
    Err(ClientError::Http {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Trim trailing slashes and default the scheme to http
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }

    let normalized = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    normalized.trim_end_matches('/').to_string()
}
