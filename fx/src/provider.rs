//! Rate provider trait and test double.

use async_trait::async_trait;
use fxquote_common::{QuoteRequest, QuoteResult, UpstreamRate};

/// Trait for mid-market rate sources.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Look up the mid-market rate for the request's currency pair.
    ///
    /// The whole request is forwarded because the upstream API takes the
    /// amount and fixed side as lookup parameters. Implementations must not
    /// retry; retry policy belongs to the caller.
    async fn lookup(&self, request: &QuoteRequest) -> QuoteResult<UpstreamRate>;
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: dashmap::DashMap<String, QuoteResult<UpstreamRate>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: dashmap::DashMap::new(),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Answer lookups for `sell`/`buy` with the given upstream pair and rate.
    pub fn set_rate(&self, sell: &str, buy: &str, currency_pair: &str, mid_market_rate: &str) {
        let rate = UpstreamRate {
            currency_pair: currency_pair.to_string(),
            mid_market_rate: mid_market_rate.to_string(),
            fixed_side: String::new(),
        };
        self.rates.insert(Self::key(sell, buy), Ok(rate));
    }

    /// Make lookups for `sell`/`buy` fail with the given error.
    pub fn set_error(&self, sell: &str, buy: &str, error: fxquote_common::QuoteError) {
        self.rates.insert(Self::key(sell, buy), Err(error));
    }

    /// Number of lookups performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn key(sell: &str, buy: &str) -> String {
        format!("{}/{}", sell.to_uppercase(), buy.to_uppercase())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, request: &QuoteRequest) -> QuoteResult<UpstreamRate> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let key = Self::key(request.sell.code(), request.buy.code());
        self.rates
            .get(&key)
            .map(|r| r.clone())
            .unwrap_or_else(|| {
                Err(fxquote_common::QuoteError::Upstream(format!(
                    "no rate configured for {}",
                    key
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxquote_common::{Currency, FixedSide, QuoteError};

    fn request() -> QuoteRequest {
        QuoteRequest::new(Currency::aud(), Currency::usd(), "1000", FixedSide::Sell)
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test");
        provider.set_rate("AUD", "USD", "AUDUSD", "0.65");

        let rate = provider.lookup(&request()).await.unwrap();

        assert_eq!(rate.currency_pair, "AUDUSD");
        assert_eq!(rate.mid_market_rate, "0.65");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_unknown_pair() {
        let provider = MockRateProvider::new("test");

        let result = provider.lookup(&request()).await;

        assert!(matches!(result, Err(QuoteError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_mock_provider_configured_error() {
        let provider = MockRateProvider::new("test");
        provider.set_error("AUD", "USD", QuoteError::UpstreamFormat("truncated".into()));

        let result = provider.lookup(&request()).await;

        assert_eq!(result, Err(QuoteError::UpstreamFormat("truncated".into())));
    }
}
