//! Client error types.

use thiserror::Error;

/// Errors raised by the quote client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The pricing server could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The pricing server answered with a failure status.
    #[error("Pricing failed ({status}): {message}")]
    Server { status: u16, message: String },

    /// The pricing server answered with a body that is not a quote.
    #[error("Could not decode quote: {0}")]
    Decode(String),

    /// The session controller is no longer running.
    #[error("Quote session has stopped")]
    ControllerClosed,
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
