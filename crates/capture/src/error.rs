//! Error types for Capture

use thiserror::Error;

/// Errors that can occur while building or fetching capture URLs
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Client is missing credentials or has an unusable setting
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Argument passed to a build call is unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    Connect(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Service answered with a non-success status
    #[error("Capture service returned HTTP {status}")]
    RemoteStatus {
        /// HTTP status code
        status: u16,
        /// Response body, lossily decoded
        body: String,
    },

    /// Response body is not the expected JSON
    #[error("Failed to decode response body")]
    Decode(#[source] serde_json::Error),
}

impl CaptureError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CaptureError::Timeout
        } else if err.is_connect() {
            CaptureError::Connect(err)
        } else {
            CaptureError::Request(err.to_string())
        }
    }

    /// True for failures reported by the transport or the remote service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CaptureError::Timeout
                | CaptureError::Connect(_)
                | CaptureError::Request(_)
                | CaptureError::RemoteStatus { .. }
                | CaptureError::Decode(_)
        )
    }

    /// HTTP status of a [`CaptureError::RemoteStatus`] error
    pub fn status(&self) -> Option<u16> {
        match self {
            CaptureError::RemoteStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CaptureError::Configuration("Key and Secret is required".into()).to_string(),
            "Configuration error: Key and Secret is required"
        );
        assert_eq!(
            CaptureError::InvalidArgument("url should be of type string".into()).to_string(),
            "Invalid argument: url should be of type string"
        );
        assert_eq!(CaptureError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            CaptureError::RemoteStatus {
                status: 401,
                body: "Unauthorized".into()
            }
            .to_string(),
            "Capture service returned HTTP 401"
        );
    }

    #[test]
    fn test_remote_classification() {
        assert!(!CaptureError::Configuration(String::new()).is_remote());
        assert!(!CaptureError::InvalidArgument(String::new()).is_remote());
        assert!(CaptureError::Timeout.is_remote());
        assert!(CaptureError::Request("reset".into()).is_remote());

        let err = CaptureError::RemoteStatus {
            status: 500,
            body: String::new(),
        };
        assert!(err.is_remote());
        assert_eq!(err.status(), Some(500));
        assert_eq!(CaptureError::Timeout.status(), None);
    }
}
