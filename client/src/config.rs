//! Client configuration.

use std::time::Duration;

use fxquote_common::{constants, Currency, DurationExt, FixedSide};

/// Configuration for the HTTP transport to the pricing server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the pricing server.
    pub server_url: String,
    /// Request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            request_timeout: constants::pricing_request_timeout().as_std(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FXQUOTE_SERVER_URL") {
            config.server_url = url;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.server_url.is_empty() {
            return Err("Server URL cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }

    /// Full URL of the pricing endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/api/fx", self.server_url.trim_end_matches('/'))
    }
}

/// Configuration of one quote session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a priced quote stays valid.
    pub quote_validity: Duration,
    /// Minimum spacing between pricing calls; bursts inside it are coalesced.
    pub requote_spacing: Duration,
    /// Sell currency the session opens with.
    pub initial_sell: Currency,
    /// Buy currency the session opens with.
    pub initial_buy: Currency,
    /// Amount the session opens with, on the `initial_fixed` leg.
    pub initial_amount: String,
    /// Leg that `initial_amount` belongs to.
    pub initial_fixed: FixedSide,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quote_validity: constants::quote_validity().as_std(),
            requote_spacing: constants::requote_spacing().as_std(),
            initial_sell: Currency::aud(),
            initial_buy: Currency::usd(),
            initial_amount: "1000".to_string(),
            initial_fixed: FixedSide::Sell,
        }
    }
}

impl SessionConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.quote_validity.is_zero() {
            return Err("Quote validity cannot be zero".to_string());
        }

        Ok(())
    }
}
