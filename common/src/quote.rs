//! Quote request and priced quote contract shared by server and client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{QuoteError, QuoteResult};
use crate::monetary::{Currency, FixedSide, Money};

/// Request for a retail quote.
///
/// `amount` stays a raw decimal string until the pricer validates it, so a
/// malformed amount surfaces as an `InvalidRequest` instead of a decoding
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Currency the customer sells.
    pub sell: Currency,
    /// Currency the customer buys.
    pub buy: Currency,
    /// Amount on the fixed side.
    pub amount: String,
    /// Which leg `amount` belongs to.
    pub fixed: FixedSide,
}

impl QuoteRequest {
    /// Create a new quote request.
    pub fn new(sell: Currency, buy: Currency, amount: impl Into<String>, fixed: FixedSide) -> Self {
        Self {
            sell,
            buy,
            amount: amount.into(),
            fixed,
        }
    }

    /// Currency of the given leg.
    pub fn currency(&self, side: FixedSide) -> &Currency {
        match side {
            FixedSide::Sell => &self.sell,
            FixedSide::Buy => &self.buy,
        }
    }

    /// Currency of the leg that gets computed.
    pub fn target_currency(&self) -> &Currency {
        self.currency(self.fixed.opposite())
    }

    /// Whether both legs are in the same currency.
    pub fn is_same_currency(&self) -> bool {
        self.sell == self.buy
    }

    /// Parse the fixed amount as a non-negative decimal.
    pub fn parsed_amount(&self) -> QuoteResult<Decimal> {
        let trimmed = self.amount.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| {
            QuoteError::InvalidRequest(format!("amount '{}' is not a decimal number", self.amount))
        })?;

        if value.is_sign_negative() && !value.is_zero() {
            return Err(QuoteError::InvalidRequest(format!(
                "amount '{}' must not be negative",
                self.amount
            )));
        }

        Ok(value)
    }

    /// Validate the request and return the parsed amount.
    pub fn validate(&self) -> QuoteResult<Decimal> {
        if self.is_same_currency() {
            return Err(QuoteError::InvalidRequest(format!(
                "sell and buy currency are both {}",
                self.sell
            )));
        }
        self.parsed_amount()
    }
}

/// Rate as returned by the upstream mid-market source.
///
/// `currency_pair` concatenates two codes in an order the upstream picks,
/// which need not match the request's sell/buy order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamRate {
    pub currency_pair: String,
    pub mid_market_rate: String,
    #[serde(default)]
    pub fixed_side: String,
}

impl UpstreamRate {
    /// Parse the mid-market rate; zero or garbage is a format error.
    pub fn parsed_rate(&self) -> QuoteResult<Decimal> {
        let rate = Decimal::from_str(self.mid_market_rate.trim()).map_err(|_| {
            QuoteError::UpstreamFormat(format!(
                "midMarketRate '{}' is not a decimal number",
                self.mid_market_rate
            ))
        })?;

        if rate <= Decimal::ZERO {
            return Err(QuoteError::UpstreamFormat(format!(
                "midMarketRate {} for {} is not positive",
                rate, self.currency_pair
            )));
        }

        Ok(rate)
    }
}

/// A priced retail quote.
///
/// Created only by the pricer and never patched; a newer quote replaces it
/// wholesale. Decimal fields serialize as strings already rounded for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedQuote {
    /// Normalized mid-market rate: units of the computed leg per unit of the fixed leg.
    pub mid_market_rate: Decimal,
    /// Markup-inclusive rate, always buy amount / sell amount.
    pub conversion_rate: Decimal,
    /// Which leg the request fixed.
    pub fixed_side: FixedSide,
    /// Buy leg.
    pub buy: Money,
    /// Sell leg.
    pub sell: Money,
}
