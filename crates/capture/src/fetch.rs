//! Convenience fetch layer
//!
//! Builds the signed URL, GETs it through the client's transport and decodes
//! the body. No retries; errors come back as reported by the transport.

use crate::client::Capture;
use crate::error::CaptureError;
use crate::options::RequestOptions;
use crate::types::{CaptureKind, CaptureRequest, ContentResponse, MetadataResponse};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

impl Capture {
    /// Fetch the raw body of any capture kind
    pub async fn fetch(
        &self,
        kind: CaptureKind,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<Bytes, CaptureError> {
        let capture_url = self.build_url(kind, url, options)?;
        debug!(transport = self.transport.name(), kind = %kind, "Fetching capture");
        self.transport.get(&capture_url).await
    }

    /// Fetch the raw body for a [`CaptureRequest`]
    pub async fn fetch_request(&self, request: &CaptureRequest) -> Result<Bytes, CaptureError> {
        self.fetch(request.kind, &request.url, Some(&request.options))
            .await
    }

    /// Fetch a screenshot
    pub async fn fetch_image(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<Bytes, CaptureError> {
        self.fetch(CaptureKind::Image, url, options).await
    }

    /// Fetch a PDF
    pub async fn fetch_pdf(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<Bytes, CaptureError> {
        self.fetch(CaptureKind::Pdf, url, options).await
    }

    /// Fetch an animated capture
    pub async fn fetch_animated(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<Bytes, CaptureError> {
        self.fetch(CaptureKind::Animated, url, options).await
    }

    /// Fetch extracted page content
    pub async fn fetch_content(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<ContentResponse, CaptureError> {
        self.fetch_json(CaptureKind::Content, url, options).await
    }

    /// Fetch extracted page metadata
    pub async fn fetch_metadata(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<MetadataResponse, CaptureError> {
        self.fetch_json(CaptureKind::Metadata, url, options).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        kind: CaptureKind,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<T, CaptureError> {
        let body = self.fetch(kind, url, options).await?;
        serde_json::from_slice(&body).map_err(CaptureError::Decode)
    }
}
