/// Content backend error types
use thiserror::Error;

/// Failure talking to the content backend.
///
/// Holds rendered messages rather than the underlying errors so results can
/// travel inside UI messages, which must be `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsError {
    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    /// The body was not the JSON we expected
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The configured base URL cannot be used
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for CmsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CmsError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            CmsError::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            CmsError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for CmsError {
    fn from(err: url::ParseError) -> Self {
        CmsError::InvalidUrl(err.to_string())
    }
}
