//! Core types for Capture

use crate::error::CaptureError;
use crate::options::{OptionValue, RequestOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of capture the service should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    /// Screenshot
    Image,
    /// PDF rendering
    Pdf,
    /// Extracted page content (HTML and text)
    Content,
    /// Extracted page metadata
    Metadata,
    /// Animated capture (GIF)
    Animated,
}

impl CaptureKind {
    /// All capture kinds
    pub const ALL: [CaptureKind; 5] = [
        CaptureKind::Image,
        CaptureKind::Pdf,
        CaptureKind::Content,
        CaptureKind::Metadata,
        CaptureKind::Animated,
    ];

    /// Path segment used in capture URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureKind::Image => "image",
            CaptureKind::Pdf => "pdf",
            CaptureKind::Content => "content",
            CaptureKind::Metadata => "metadata",
            CaptureKind::Animated => "animated",
        }
    }

    /// Returns true if the service answers this kind with JSON
    pub fn is_json(&self) -> bool {
        matches!(self, CaptureKind::Content | CaptureKind::Metadata)
    }
}

impl FromStr for CaptureKind {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaptureKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CaptureError::InvalidArgument(format!("unknown capture kind: {}", s)))
    }
}

impl std::fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single capture request: kind, target page and options
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// What to capture
    pub kind: CaptureKind,
    /// Target page URL, forwarded without validation
    pub url: String,
    /// Request options in serialization order
    pub options: RequestOptions,
}

impl CaptureRequest {
    /// Create a request without options
    pub fn new(kind: CaptureKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            options: RequestOptions::new(),
        }
    }

    /// Append or replace an option
    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.set(key, value);
        self
    }

    /// Replace all options
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse a request from a dynamic JSON value
    ///
    /// Expects `{"type": "...", "url": "...", "options": {...}}`, where
    /// `options` is optional and keeps its key order.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CaptureError> {
        let serde_json::Value::Object(mut map) = value else {
            return Err(CaptureError::InvalidArgument(
                "capture request must be a JSON object".to_string(),
            ));
        };

        let kind = match map.remove("type") {
            Some(serde_json::Value::String(s)) => s.parse()?,
            _ => {
                return Err(CaptureError::InvalidArgument(
                    "type should be one of image, pdf, content, metadata, animated".to_string(),
                ))
            }
        };

        let url = match map.remove("url") {
            Some(serde_json::Value::String(s)) => s,
            None | Some(serde_json::Value::Null) => {
                return Err(CaptureError::InvalidArgument("url is required".to_string()))
            }
            Some(_) => {
                return Err(CaptureError::InvalidArgument(
                    "url should be of type string (something like www.google.com)".to_string(),
                ))
            }
        };

        let options = match map.remove("options") {
            Some(value) => RequestOptions::try_from(value)?,
            None => RequestOptions::new(),
        };

        Ok(Self { kind, url, options })
    }
}

/// Response body of a `content` capture
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ContentResponse {
    /// Whether the service extracted the content
    pub success: bool,

    /// Page HTML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Page text content
    #[serde(
        default,
        rename = "textContent",
        skip_serializing_if = "Option::is_none"
    )]
    pub text_content: Option<String>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response body of a `metadata` capture
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MetadataResponse {
    /// Whether the service extracted the metadata
    pub success: bool,

    /// Page metadata (title, description, icons, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
