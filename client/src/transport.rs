//! Transport from a quote session to the pricing server.

use async_trait::async_trait;
use fxquote_common::{PricedQuote, QuoteRequest};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Trait for anything that can price a quote request.
#[async_trait]
pub trait QuoteTransport: Send + Sync {
    /// Price one request. Implementations must not retry.
    async fn fetch_quote(&self, request: &QuoteRequest) -> ClientResult<PricedQuote>;
}

/// Transport that posts requests to the pricing server's `/api/fx` endpoint.
pub struct HttpQuoteTransport {
    client: Client,
    endpoint: String,
}

impl HttpQuoteTransport {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }
}

#[async_trait]
impl QuoteTransport for HttpQuoteTransport {
    #[instrument(skip(self, request), fields(sell = %request.sell, buy = %request.buy, fixed = %request.fixed))]
    async fn fetch_quote(&self, request: &QuoteRequest) -> ClientResult<PricedQuote> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = %status, "Pricing request rejected");
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let quote: PricedQuote = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        debug!(conversion_rate = %quote.conversion_rate, "Received quote");

        Ok(quote)
    }
}

#[cfg(any(test, feature = "test-utils"))]
type Responder = Box<dyn Fn(&QuoteRequest) -> ClientResult<PricedQuote> + Send + Sync>;

/// Mock transport for testing.
///
/// Records every request and answers through a responder closure, optionally
/// after a delay so in-flight behaviour can be exercised under paused time.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTransport {
    responder: Responder,
    delay: std::time::Duration,
    requests: parking_lot::Mutex<Vec<QuoteRequest>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Answer with a custom responder.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&QuoteRequest) -> ClientResult<PricedQuote> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: std::time::Duration::ZERO,
            requests: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Price every request at a flat rate, buy per unit of sell, no markup.
    pub fn fixed_rate(rate: rust_decimal::Decimal) -> Self {
        use fxquote_common::{round_to, FixedSide, Money};

        Self::new(move |request| {
            let amount = request
                .parsed_amount()
                .map_err(|e| ClientError::Server {
                    status: 400,
                    message: e.to_string(),
                })?;
            let (sell, buy) = match request.fixed {
                FixedSide::Sell => (amount, amount * rate),
                FixedSide::Buy => (amount / rate, amount),
            };

            Ok(PricedQuote {
                mid_market_rate: rate,
                conversion_rate: rate,
                fixed_side: request.fixed,
                buy: Money::new(round_to(buy, 2), request.buy.clone()),
                sell: Money::new(round_to(sell, 2), request.sell.clone()),
            })
        })
    }

    /// Fail every request with a server error.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_| {
            Err(ClientError::Server {
                status: 500,
                message: message.clone(),
            })
        })
    }

    /// Delay every answer.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<QuoteRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl QuoteTransport for MockTransport {
    async fn fetch_quote(&self, request: &QuoteRequest) -> ClientResult<PricedQuote> {
        self.requests.lock().push(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        (self.responder)(request)
    }
}
