//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fxquote_common::QuoteError;
use tracing::{error, warn};

/// Message returned for any upstream failure. Upstream detail stays in the logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Unable to fetch the exchange rate, please try again.";

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// Body could not be decoded into a quote request.
    MalformedBody(String),
    /// Pricing failed.
    Pricing(QuoteError),
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        ApiError::Pricing(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MalformedBody(message) => {
                warn!(error = %message, "Rejected malformed quote request");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::Pricing(err) if err.is_upstream() => {
                error!(error = %err, code = err.error_code(), "Pricing failed");
                (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE_MESSAGE).into_response()
            }
            ApiError::Pricing(err) => {
                warn!(error = %err, code = err.error_code(), "Rejected invalid quote request");
                (StatusCode::BAD_REQUEST, err.to_string()).into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
