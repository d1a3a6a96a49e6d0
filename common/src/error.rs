//! Error types for quote pricing.

use thiserror::Error;

/// Errors raised while pricing a quote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// The request itself is malformed; rejected before any network call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The rate source was unreachable or answered with a non-success status.
    #[error("Upstream rate source error: {0}")]
    Upstream(String),

    /// The rate source answered but the payload could not be understood.
    #[error("Upstream rate source returned an unreadable payload: {0}")]
    UpstreamFormat(String),
}

impl QuoteError {
    /// Whether the failure originates from the rate source.
    pub fn is_upstream(&self) -> bool {
        matches!(self, QuoteError::Upstream(_) | QuoteError::UpstreamFormat(_))
    }

    /// Get error code for logs and responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            QuoteError::InvalidRequest(_) => "INVALID_REQUEST",
            QuoteError::Upstream(_) => "UPSTREAM_ERROR",
            QuoteError::UpstreamFormat(_) => "UPSTREAM_FORMAT_ERROR",
        }
    }
}

/// Result type alias for quote operations.
pub type QuoteResult<T> = std::result::Result<T, QuoteError>;
