//! HTTP client for the public mid-market rate endpoint.

use std::time::Duration;

use async_trait::async_trait;
use fxquote_common::{constants, DurationExt, QuoteError, QuoteRequest, QuoteResult, UpstreamRate};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::provider::RateProvider;

/// Public rates endpoint used when no override is configured.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://wnvgqqihv6.execute-api.ap-southeast-2.amazonaws.com/Public/public/rates";

/// Provider ID constant
const PROVIDER_ID: &str = "PUBLIC_RATES_API";

/// Configuration for the upstream rate source.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL; query parameters are appended per lookup.
    pub base_url: String,
    /// Timeout for a single lookup.
    pub request_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            request_timeout: constants::upstream_request_timeout().as_std(),
        }
    }
}

impl UpstreamConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FXQUOTE_UPSTREAM_URL") {
            config.base_url = url;
        }

        if let Ok(secs) = std::env::var("FXQUOTE_UPSTREAM_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Upstream URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Upstream URL '{}' is not an http(s) URL", self.base_url));
        }

        if self.request_timeout.is_zero() {
            return Err("Upstream timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

/// Rate provider backed by the public rates HTTP API.
pub struct HttpRateProvider {
    client: Client,
    base_url: String,
}

impl HttpRateProvider {
    /// Create a new provider from configuration.
    pub fn new(config: UpstreamConfig) -> QuoteResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| QuoteError::Upstream(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    #[instrument(skip(self, request), fields(sell = %request.sell, buy = %request.buy, fixed = %request.fixed))]
    async fn lookup(&self, request: &QuoteRequest) -> QuoteResult<UpstreamRate> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("Sell", request.sell.code()),
                ("Buy", request.buy.code()),
                ("Amount", request.amount.trim()),
                ("Fixed", request.fixed.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Rate lookup transport failure");
                QuoteError::Upstream(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Rate lookup rejected");
            return Err(QuoteError::Upstream(format!(
                "rate source answered {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| QuoteError::Upstream(e.to_string()))?;

        let rate: UpstreamRate = serde_json::from_str(&body)
            .map_err(|e| QuoteError::UpstreamFormat(e.to_string()))?;

        debug!(
            pair = %rate.currency_pair,
            mid = %rate.mid_market_rate,
            "Got rate from upstream"
        );

        Ok(rate)
    }
}
