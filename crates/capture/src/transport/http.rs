//! Default HTTP transport backed by reqwest

use crate::error::CaptureError;
use crate::transport::Transport;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout; rendering a page can take a while
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// reqwest-based transport
///
/// A client is built per request with the configured User-Agent and
/// timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    user_agent: Option<String>,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with the default User-Agent and timeout
    pub fn new() -> Self {
        Self {
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom User-Agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set the total request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn client(&self) -> Result<reqwest::Client, CaptureError> {
        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(CaptureError::ClientBuild)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, url: &str) -> Result<Bytes, CaptureError> {
        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(CaptureError::from_reqwest)?;

        let status = response.status();
        debug!(status = status.as_u16(), "Capture response");

        let body = response.bytes().await.map_err(CaptureError::from_reqwest)?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Capture request rejected");
            return Err(CaptureError::RemoteStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body)
    }
}
