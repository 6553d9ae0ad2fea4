//! Capture - signed URL builder and client for the Capture API
//!
//! This crate builds authenticated URLs for the Capture page-capture service
//! (screenshots, PDFs, animated captures, content and metadata extraction)
//! and can fetch them on the caller's behalf.
//!
//! ## Building URLs
//!
//! ```
//! use capture::{Capture, RequestOptions};
//!
//! let capture = Capture::new("test", "test");
//! let options = RequestOptions::new().with("full", true).with("delay", 3);
//! let url = capture
//!     .build_image_url("https://capture.page/", Some(&options))
//!     .unwrap();
//!
//! assert_eq!(
//!     url,
//!     "https://cdn.capture.page/test/0e944abb6d823d0c8618dc22e508be6d/image?full=true&delay=3&url=https%3A%2F%2Fcapture.page%2F"
//! );
//! ```
//!
//! Option order matters: the token is computed over the serialized query
//! string, so reordering options yields a different URL.
//!
//! ## Fetching
//!
//! The `fetch_*` methods GET the built URL through a [`Transport`]
//! ([`HttpTransport`] by default) and return bytes or decoded JSON.

pub mod client;
mod error;
mod fetch;
pub mod options;
pub mod transport;
mod types;

pub use client::{generate_token, Capture, CaptureBuilder, API_URL, EDGE_API_URL};
pub use error::CaptureError;
pub use options::{canonicalize, OptionValue, RequestOptions};
pub use transport::{HttpTransport, Transport};
pub use types::{CaptureKind, CaptureRequest, ContentResponse, MetadataResponse};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = concat!("capture-rust/", env!("CARGO_PKG_VERSION"));
