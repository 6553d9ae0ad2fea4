//! HTTP transport used by the fetch layer
//!
//! Design: URL building never touches the network. Fetching goes through a
//! [`Transport`], so callers can swap in their own HTTP stack.

mod http;

pub use http::HttpTransport;

use crate::error::CaptureError;
use async_trait::async_trait;
use bytes::Bytes;

/// Issues unauthenticated GET requests against built capture URLs
///
/// Implementations return the response body for 2xx statuses and an error
/// for anything else. They must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identifier for this transport (for logging/debugging)
    fn name(&self) -> &'static str;

    /// GET the URL and return the full body
    async fn get(&self, url: &str) -> Result<Bytes, CaptureError>;
}
