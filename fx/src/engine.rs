//! Retail pricer.

use std::str::FromStr;
use std::sync::Arc;

use fxquote_common::{round_to, Money, PricedQuote, QuoteRequest, QuoteResult};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::conversion::{apply_markup, normalize_mid_market_rate};
use crate::provider::RateProvider;

/// Configuration for the pricer.
#[derive(Debug, Clone)]
pub struct PricerConfig {
    /// Retail margin applied to every quote (0.005 = 0.5%).
    pub margin: Decimal,
    /// Decimal places of the reported mid-market rate.
    pub rate_places: u32,
    /// Decimal places of the reported conversion rate.
    pub conversion_places: u32,
    /// Decimal places of both leg amounts.
    pub amount_places: u32,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            margin: Decimal::new(5, 3),
            rate_places: 2,
            conversion_places: 4,
            amount_places: 2,
        }
    }
}

impl PricerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(margin) = std::env::var("FXQUOTE_MARGIN") {
            if let Ok(margin) = Decimal::from_str(margin.trim()) {
                config.margin = margin;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.margin < Decimal::ZERO || self.margin >= Decimal::ONE {
            return Err(format!("Margin {} must be within [0, 1)", self.margin));
        }

        Ok(())
    }
}

/// Stateless pricer: one upstream lookup per quote, no retries, no caching.
pub struct Pricer {
    provider: Arc<dyn RateProvider>,
    config: PricerConfig,
}

impl Pricer {
    /// Create a new pricer with the given provider.
    pub fn new(provider: Arc<dyn RateProvider>, config: PricerConfig) -> Self {
        Self { provider, config }
    }

    /// Price a quote request.
    ///
    /// The request is validated before the rate source is contacted, so a
    /// malformed amount or a same-currency pair never costs an upstream call.
    #[instrument(skip(self), fields(
        sell = %request.sell,
        buy = %request.buy,
        fixed = %request.fixed,
        amount = %request.amount
    ))]
    pub async fn price(&self, request: &QuoteRequest) -> QuoteResult<PricedQuote> {
        let amount = request.validate()?;

        let upstream = self.provider.lookup(request).await?;
        let raw_rate = upstream.parsed_rate()?;
        let mid_market_rate =
            normalize_mid_market_rate(&upstream.currency_pair, raw_rate, request.target_currency())?;

        debug!(
            provider = self.provider.name(),
            pair = %upstream.currency_pair,
            raw_rate = %raw_rate,
            normalized = %mid_market_rate,
            "Normalized upstream rate"
        );

        let legs = apply_markup(amount, mid_market_rate, request.fixed, self.config.margin)?;

        let quote = PricedQuote {
            mid_market_rate: round_to(mid_market_rate, self.config.rate_places),
            conversion_rate: round_to(legs.conversion_rate(), self.config.conversion_places),
            fixed_side: request.fixed,
            buy: Money::new(legs.buy, request.buy.clone()).round(self.config.amount_places),
            sell: Money::new(legs.sell, request.sell.clone()).round(self.config.amount_places),
        };

        info!(
            conversion_rate = %quote.conversion_rate,
            sell_amount = %quote.sell.value,
            buy_amount = %quote.buy.value,
            "Quote priced"
        );

        Ok(quote)
    }
}
