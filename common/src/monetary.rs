//! Monetary types for FxQuote.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Round half away from zero and pin the scale, so `0` rendered at two places
/// is `"0.00"` rather than `"0"`.
pub fn round_to(value: Decimal, places: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    rounded
}

/// A monetary amount with currency.
///
/// On the wire the value is carried as a decimal string under `amount`, which
/// keeps display values free of floating point drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    #[serde(rename = "amount")]
    pub value: Decimal,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// Round to a fixed number of decimal places for display.
    pub fn round(&self, places: u32) -> Self {
        Self {
            value: round_to(self.value, places),
            currency: self.currency.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn aud() -> Self {
        Self::new("AUD")
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Which leg of a conversion the customer specified directly.
///
/// The amount on the fixed side is authoritative; the other leg is derived
/// from the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedSide {
    Sell,
    Buy,
}

impl FixedSide {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FixedSide::Sell => "sell",
            FixedSide::Buy => "buy",
        }
    }

    /// The derived side.
    pub fn opposite(&self) -> Self {
        match self {
            FixedSide::Sell => FixedSide::Buy,
            FixedSide::Buy => FixedSide::Sell,
        }
    }
}

impl fmt::Display for FixedSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FixedSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sell" => Ok(FixedSide::Sell),
            "buy" => Ok(FixedSide::Buy),
            other => Err(format!("unknown fixed side '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_to_pads_scale() {
        assert_eq!(round_to(Decimal::ZERO, 2).to_string(), "0.00");
        assert_eq!(round_to(dec!(1000), 2).to_string(), "1000.00");
    }

    #[test]
    fn test_round_to_half_away_from_zero() {
        assert_eq!(round_to(dec!(0.64675), 4), dec!(0.6468));
        assert_eq!(round_to(dec!(0.12345), 4), dec!(0.1235));
        assert_eq!(round_to(dec!(2.005), 2), dec!(2.01));
    }

    #[test]
    fn test_currency_normalizes_code() {
        assert_eq!(Currency::new(" aud "), Currency::aud());
        assert_eq!(Currency::from("usd").code(), "USD");
    }

    #[test]
    fn test_money_wire_format() {
        let money = Money::new(dec!(646.75), Currency::usd());
        let json = serde_json::to_value(&money).unwrap();
        assert_eq!(json["amount"], "646.75");
        assert_eq!(json["currency"], "USD");

        let parsed: Money = serde_json::from_str(r#"{"amount":"12.50","currency":"eur"}"#).unwrap();
        assert_eq!(parsed.value, dec!(12.50));
        assert_eq!(parsed.currency.code(), "EUR");
    }

    #[test]
    fn test_fixed_side_parsing() {
        assert_eq!("SELL".parse::<FixedSide>().unwrap(), FixedSide::Sell);
        assert_eq!("buy".parse::<FixedSide>().unwrap(), FixedSide::Buy);
        assert!("both".parse::<FixedSide>().is_err());
        assert_eq!(FixedSide::Sell.opposite(), FixedSide::Buy);
        assert_eq!(serde_json::to_string(&FixedSide::Buy).unwrap(), "\"buy\"");
    }
}
