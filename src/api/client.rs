//! HTTP transport for the security API
//!
//! Wraps reqwest::Client behind the [`Transport`] trait so the session can
//! be driven by any request/response collaborator.

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a GET request and hands back the raw response body.
///
/// `Err` means the call itself did not complete; the body of a completed
/// call is interpreted by the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String>;
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url, bearer: Option<&str>) -> Result<String> {
        tracing::debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let mut request = self.http.get(url.clone());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("GET {} failed: {}", url.path(), e)))?;

        check_response(resp, url).await
    }
}

/// Read the body, keeping error statuses whose body is an envelope so the
/// caller still sees the server's code and message.
async fn check_response(resp: reqwest::Response, url: &Url) -> Result<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

    if status.is_success() || looks_like_envelope(&body) {
        if !status.is_success() {
            tracing::debug!("HTTP {} for {} carries an envelope", status.as_u16(), url.path());
        }
        return Ok(body);
    }

    Err(Error::Transport(format!(
        "HTTP {} for {}: {}",
        status.as_u16(),
        url.path(),
        body.trim()
    )))
}

fn looks_like_envelope(body: &str) -> bool {
    body.trim_start().starts_with('{')
}
