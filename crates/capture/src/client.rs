//! Capture client: credentials, host selection and URL signing
//!
//! A built URL has the shape `{host}/{key}/{token}/{kind}?{query}` where
//! `query` is the canonical query string (see [`crate::options`]) and
//! `token` is the lowercase hex md5 of `secret ++ query`. The service
//! recomputes the token from the query it receives.

use crate::error::CaptureError;
use crate::options::{canonicalize, RequestOptions};
use crate::transport::{HttpTransport, Transport};
use crate::types::{CaptureKind, CaptureRequest};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Standard API host
pub const API_URL: &str = "https://cdn.capture.page";

/// Edge API host
pub const EDGE_API_URL: &str = "https://edge.capture.page";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "CAPTURE_API_KEY";

/// Environment variable holding the API secret
pub const ENV_API_SECRET: &str = "CAPTURE_API_SECRET";

/// Environment variable enabling the edge host
pub const ENV_USE_EDGE: &str = "CAPTURE_USE_EDGE";

/// Compute the request token for a canonical query string
///
/// This is `md5(secret ++ query)`, which is what the service verifies. It is
/// not a keyed MAC.
pub fn generate_token(secret: &str, query: &str) -> String {
    let mut context = md5::Context::new();
    context.consume(secret);
    context.consume(query);
    format!("{:x}", context.compute())
}

/// Client for the Capture API
///
/// Holds the credentials, the host resolved at construction and the
/// transport used by the `fetch_*` methods. Cloning is cheap and clones
/// share the transport.
#[derive(Clone)]
pub struct Capture {
    key: String,
    secret: String,
    base_url: String,
    pub(crate) transport: Arc<dyn Transport>,
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.name())
            .finish()
    }
}

impl Capture {
    /// Create a client for the standard host with the default transport
    ///
    /// Credentials are checked when a URL is built, not here.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            base_url: API_URL.to_string(),
            transport: Arc::new(HttpTransport::new()),
        }
    }

    /// Create a client builder
    pub fn builder(key: impl Into<String>, secret: impl Into<String>) -> CaptureBuilder {
        CaptureBuilder::new(key, secret)
    }

    /// Create a client from `CAPTURE_API_KEY`, `CAPTURE_API_SECRET` and the
    /// optional `CAPTURE_USE_EDGE`
    pub fn from_env() -> Result<Self, CaptureError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, CaptureError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| CaptureError::Configuration(format!("{} is not set", name)))
        };
        let key = require(ENV_API_KEY)?;
        let secret = require(ENV_API_SECRET)?;
        let use_edge = lookup(ENV_USE_EDGE)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        CaptureBuilder::new(key, secret).use_edge(use_edge).build()
    }

    /// Public API key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Host every URL of this client starts with
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a signed capture URL
    ///
    /// `options` are serialized in their own order followed by `url`. The
    /// target URL is forwarded as-is; the service validates it.
    pub fn build_url(
        &self,
        kind: CaptureKind,
        target_url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        if self.key.is_empty() || self.secret.is_empty() {
            return Err(CaptureError::Configuration(
                "Key and Secret is required".to_string(),
            ));
        }

        let query = canonicalize(options, target_url);
        let token = generate_token(&self.secret, &query);
        trace!(kind = %kind, host = %self.base_url, "Built capture URL");

        Ok(format!(
            "{}/{}/{}/{}?{}",
            self.base_url, self.key, token, kind, query
        ))
    }

    /// Build a signed URL for a [`CaptureRequest`]
    pub fn build_request_url(&self, request: &CaptureRequest) -> Result<String, CaptureError> {
        self.build_url(request.kind, &request.url, Some(&request.options))
    }

    /// Build a screenshot URL
    pub fn build_image_url(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        self.build_url(CaptureKind::Image, url, options)
    }

    /// Build a PDF URL
    pub fn build_pdf_url(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        self.build_url(CaptureKind::Pdf, url, options)
    }

    /// Build a content extraction URL
    pub fn build_content_url(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        self.build_url(CaptureKind::Content, url, options)
    }

    /// Build a metadata extraction URL
    pub fn build_metadata_url(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        self.build_url(CaptureKind::Metadata, url, options)
    }

    /// Build an animated capture URL
    pub fn build_animated_url(
        &self,
        url: &str,
        options: Option<&RequestOptions>,
    ) -> Result<String, CaptureError> {
        self.build_url(CaptureKind::Animated, url, options)
    }
}

/// Builder for configuring a [`Capture`] client
#[derive(Clone)]
pub struct CaptureBuilder {
    key: String,
    secret: String,
    use_edge: bool,
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl CaptureBuilder {
    /// Create a builder for the standard host
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            use_edge: false,
            base_url: None,
            user_agent: None,
            timeout: None,
            transport: None,
        }
    }

    /// Use the edge host instead of the standard one
    pub fn use_edge(mut self, enable: bool) -> Self {
        self.use_edge = enable;
        self
    }

    /// Use a custom host, overriding `use_edge`
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set custom User-Agent for the default transport
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout for the default transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom transport; `user_agent` and `timeout` are then ignored
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Capture, CaptureError> {
        let base_url = match self.base_url {
            Some(raw) => parse_base_url(&raw)?,
            None if self.use_edge => EDGE_API_URL.to_string(),
            None => API_URL.to_string(),
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut http = HttpTransport::new();
                if let Some(ua) = self.user_agent {
                    http = http.with_user_agent(ua);
                }
                if let Some(timeout) = self.timeout {
                    http = http.with_timeout(timeout);
                }
                Arc::new(http)
            }
        };

        Ok(Capture {
            key: self.key,
            secret: self.secret,
            base_url,
            transport,
        })
    }
}

/// Validate a base URL override and strip trailing slashes
fn parse_base_url(raw: &str) -> Result<String, CaptureError> {
    let parsed = Url::parse(raw)
        .map_err(|e| CaptureError::Configuration(format!("invalid base URL {}: {}", raw, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CaptureError::Configuration(
            "base URL must start with http:// or https://".to_string(),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HN: &str = "https://news.ycombinator.com/";

    fn client() -> Capture {
        Capture::new("test", "test")
    }

    fn full_delay() -> RequestOptions {
        RequestOptions::new().with("full", true).with("delay", 3)
    }

    #[test]
    fn test_generate_token() {
        assert_eq!(
            generate_token("test", "url=https%3A%2F%2Fnews.ycombinator.com%2F"),
            "f37d5fb3ee4540a05bf4ffeed6dffa28"
        );
        assert_eq!(
            generate_token("test", "url=https%3A%2F%2Fexample.com%2F"),
            "c4ae7a96f3d2fe46abd981f8dba8f042"
        );
    }

    #[test]
    fn test_build_image_url() {
        assert_eq!(
            client().build_image_url(HN, None).unwrap(),
            "https://cdn.capture.page/test/f37d5fb3ee4540a05bf4ffeed6dffa28/image?url=https%3A%2F%2Fnews.ycombinator.com%2F"
        );
    }

    #[test]
    fn test_build_image_url_with_options() {
        assert_eq!(
            client()
                .build_image_url("https://capture.page/", Some(&full_delay()))
                .unwrap(),
            "https://cdn.capture.page/test/0e944abb6d823d0c8618dc22e508be6d/image?full=true&delay=3&url=https%3A%2F%2Fcapture.page%2F"
        );
    }

    #[test]
    fn test_build_url_per_kind() {
        let capture = client();
        let token = "f37d5fb3ee4540a05bf4ffeed6dffa28";
        let query = "url=https%3A%2F%2Fnews.ycombinator.com%2F";
        let cases = [
            (capture.build_pdf_url(HN, None), "pdf"),
            (capture.build_content_url(HN, None), "content"),
            (capture.build_metadata_url(HN, None), "metadata"),
            (capture.build_animated_url(HN, None), "animated"),
        ];
        for (url, kind) in cases {
            assert_eq!(
                url.unwrap(),
                format!("https://cdn.capture.page/test/{}/{}?{}", token, kind, query)
            );
        }
    }

    #[test]
    fn test_build_pdf_url_with_options() {
        assert_eq!(
            client()
                .build_pdf_url("https://example.com/", Some(&full_delay()))
                .unwrap(),
            "https://cdn.capture.page/test/37708e30db297b58594c54f8be0ae188/pdf?full=true&delay=3&url=https%3A%2F%2Fexample.com%2F"
        );
    }

    #[test]
    fn test_explicit_zero_is_signed() {
        let options = RequestOptions::new().with("delay", 0);
        assert_eq!(
            client()
                .build_animated_url("https://example.com/", Some(&options))
                .unwrap(),
            "https://cdn.capture.page/test/ba34bb033eb1ea4d73f6c998b9379a41/animated?delay=0&url=https%3A%2F%2Fexample.com%2F"
        );
    }

    #[test]
    fn test_deterministic() {
        let capture = client();
        let options = full_delay();
        let first = capture.build_pdf_url(HN, Some(&options)).unwrap();
        for _ in 0..10 {
            assert_eq!(capture.build_pdf_url(HN, Some(&options)).unwrap(), first);
        }
    }

    #[test]
    fn test_order_changes_token() {
        let capture = client();
        let a = RequestOptions::new().with("full", true).with("delay", 3);
        let b = RequestOptions::new().with("delay", 3).with("full", true);
        let url_a = capture.build_image_url(HN, Some(&a)).unwrap();
        let url_b = capture.build_image_url(HN, Some(&b)).unwrap();
        assert_ne!(url_a, url_b);
        assert_ne!(url_a.split('/').nth(4), url_b.split('/').nth(4));
    }

    #[test]
    fn test_missing_credentials() {
        for capture in [
            Capture::new("", "test"),
            Capture::new("test", ""),
            Capture::new("", ""),
        ] {
            let err = capture.build_image_url(HN, None).unwrap_err();
            assert!(matches!(err, CaptureError::Configuration(_)));
            assert!(err.to_string().contains("Key and Secret is required"));
        }
    }

    #[test]
    fn test_target_url_not_validated() {
        let url = client().build_image_url("not a url", None).unwrap();
        assert!(url.ends_with("/image?url=not%20a%20url"));
    }

    #[test]
    fn test_edge_host() {
        let capture = Capture::builder("test", "test").use_edge(true).build().unwrap();
        assert_eq!(capture.base_url(), EDGE_API_URL);
        for kind in CaptureKind::ALL {
            let url = capture.build_url(kind, HN, None).unwrap();
            assert!(url.starts_with("https://edge.capture.page/"), "{}", url);
        }
    }

    #[test]
    fn test_default_host() {
        let capture = Capture::builder("test", "test").build().unwrap();
        assert_eq!(capture.base_url(), API_URL);
        for kind in CaptureKind::ALL {
            let url = capture.build_url(kind, HN, None).unwrap();
            assert!(url.starts_with("https://cdn.capture.page/"), "{}", url);
        }
    }

    #[test]
    fn test_edge_and_standard_share_token() {
        let edge = Capture::builder("test", "test").use_edge(true).build().unwrap();
        let edge_url = edge.build_image_url(HN, None).unwrap();
        let cdn_url = client().build_image_url(HN, None).unwrap();
        assert_eq!(
            edge_url.trim_start_matches(EDGE_API_URL),
            cdn_url.trim_start_matches(API_URL)
        );
    }

    #[test]
    fn test_base_url_override() {
        let capture = Capture::builder("test", "test")
            .use_edge(true)
            .base_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(capture.base_url(), "http://127.0.0.1:8080");
        assert!(capture
            .build_image_url(HN, None)
            .unwrap()
            .starts_with("http://127.0.0.1:8080/test/"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Capture::builder("test", "test").base_url("not a url").build();
        assert!(matches!(result, Err(CaptureError::Configuration(_))));

        let result = Capture::builder("test", "test")
            .base_url("ftp://example.com")
            .build();
        assert!(matches!(result, Err(CaptureError::Configuration(_))));
    }

    #[test]
    fn test_build_request_url() {
        let request = CaptureRequest::new(CaptureKind::Image, "https://capture.page/")
            .option("full", true)
            .option("delay", 3);
        assert_eq!(
            client().build_request_url(&request).unwrap(),
            client()
                .build_image_url("https://capture.page/", Some(&full_delay()))
                .unwrap()
        );
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "key"),
            (ENV_API_SECRET, "secret"),
            (ENV_USE_EDGE, "TRUE"),
        ]
        .into_iter()
        .collect();
        let capture = Capture::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(capture.key(), "key");
        assert_eq!(capture.base_url(), EDGE_API_URL);
    }

    #[test]
    fn test_from_lookup_missing_secret() {
        let err = Capture::from_lookup(|name| (name == ENV_API_KEY).then(|| "key".to_string()))
            .unwrap_err();
        assert!(matches!(err, CaptureError::Configuration(_)));
        assert!(err.to_string().contains(ENV_API_SECRET));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", Capture::new("public", "hunter2"));
        assert!(rendered.contains("public"));
        assert!(!rendered.contains("hunter2"));
    }
}
