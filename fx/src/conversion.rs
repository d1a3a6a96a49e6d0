//! Rate normalization and markup arithmetic.
//!
//! Everything here works on unrounded decimals. Rounding for display happens
//! once, in the pricer, after all arithmetic is done.

use fxquote_common::{Currency, FixedSide, QuoteError, QuoteResult};
use rust_decimal::Decimal;

/// Express an upstream rate as units of `target` per unit of the fixed leg.
///
/// The upstream concatenates the two codes in whatever order it likes. When the
/// pair ends with the target code the rate already has the right orientation,
/// otherwise it is inverted.
pub fn normalize_mid_market_rate(
    currency_pair: &str,
    rate: Decimal,
    target: &Currency,
) -> QuoteResult<Decimal> {
    if currency_pair.trim().to_uppercase().ends_with(target.code()) {
        return Ok(rate);
    }

    Decimal::ONE.checked_div(rate).ok_or_else(|| {
        QuoteError::UpstreamFormat(format!("cannot invert rate {} for {}", rate, currency_pair))
    })
}

/// Both leg amounts of a conversion, before rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Legs {
    pub sell: Decimal,
    pub buy: Decimal,
}

impl Legs {
    /// Effective rate, buy per sell. Zero when nothing is sold.
    pub fn conversion_rate(&self) -> Decimal {
        if self.sell.is_zero() {
            return Decimal::ZERO;
        }
        self.buy / self.sell
    }
}

/// Derive the non-fixed leg from the fixed amount and the normalized rate.
///
/// With the sell side fixed the house pays out less than the fair conversion;
/// with the buy side fixed it charges more than fair value.
pub fn apply_markup(
    amount: Decimal,
    mid_market_rate: Decimal,
    fixed: FixedSide,
    margin: Decimal,
) -> QuoteResult<Legs> {
    let factor = match fixed {
        FixedSide::Sell => Decimal::ONE - margin,
        FixedSide::Buy => Decimal::ONE + margin,
    };

    let derived = amount
        .checked_mul(mid_market_rate)
        .and_then(|fair| fair.checked_mul(factor))
        .ok_or_else(|| QuoteError::InvalidRequest(format!("amount {} is too large", amount)))?;

    Ok(match fixed {
        FixedSide::Sell => Legs {
            sell: amount,
            buy: derived,
        },
        FixedSide::Buy => Legs {
            sell: derived,
            buy: amount,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_keeps_matching_orientation() {
        let rate = normalize_mid_market_rate("AUDUSD", dec!(0.65), &Currency::usd()).unwrap();
        assert_eq!(rate, dec!(0.65));
    }

    #[test]
    fn test_normalize_inverts_reversed_pair() {
        let rate = normalize_mid_market_rate("USDAUD", dec!(0.65), &Currency::usd()).unwrap();
        assert_eq!(rate, Decimal::ONE / dec!(0.65));
    }

    #[test]
    fn test_normalize_zero_rate_is_format_error() {
        let result = normalize_mid_market_rate("USDAUD", Decimal::ZERO, &Currency::usd());
        assert!(matches!(result, Err(QuoteError::UpstreamFormat(_))));
    }

    #[test]
    fn test_markup_sell_fixed() {
        let legs = apply_markup(dec!(1000), dec!(0.65), FixedSide::Sell, dec!(0.005)).unwrap();
        assert_eq!(legs.sell, dec!(1000));
        assert_eq!(legs.buy, dec!(646.75));
        assert_eq!(legs.conversion_rate(), dec!(0.64675));
    }

    #[test]
    fn test_markup_buy_fixed() {
        let legs = apply_markup(dec!(500), dec!(2), FixedSide::Buy, dec!(0.005)).unwrap();
        assert_eq!(legs.buy, dec!(500));
        assert_eq!(legs.sell, dec!(1005));
    }

    #[test]
    fn test_zero_amount() {
        let legs = apply_markup(Decimal::ZERO, dec!(0.65), FixedSide::Sell, dec!(0.005)).unwrap();
        assert!(legs.buy.is_zero());
        assert!(legs.conversion_rate().is_zero());
    }

    #[test]
    fn test_overflow_is_rejected() {
        let result = apply_markup(Decimal::MAX, dec!(2), FixedSide::Sell, dec!(0.005));
        assert!(matches!(result, Err(QuoteError::InvalidRequest(_))));
    }

    proptest! {
        #[test]
        fn prop_normalized_rate_is_target_per_fixed(raw in 1u32..10_000_000u32) {
            let rate = Decimal::new(raw as i64, 4);
            let direct = normalize_mid_market_rate("EURGBP", rate, &Currency::new("GBP")).unwrap();
            let reversed = normalize_mid_market_rate("GBPEUR", rate, &Currency::new("GBP")).unwrap();

            prop_assert_eq!(direct, rate);
            let product = reversed * rate;
            prop_assert!((product - Decimal::ONE).abs() < dec!(0.000000000001));
        }

        #[test]
        fn prop_markup_favors_house(amount in 1u64..100_000_000u64, raw_rate in 1u32..1_000_000u32) {
            let amount = Decimal::new(amount as i64, 2);
            let rate = Decimal::new(raw_rate as i64, 4);
            let margin = dec!(0.005);

            let sell_fixed = apply_markup(amount, rate, FixedSide::Sell, margin).unwrap();
            prop_assert!(sell_fixed.buy < amount * rate);
            prop_assert!(sell_fixed.conversion_rate() < rate);

            let buy_fixed = apply_markup(amount, rate, FixedSide::Buy, margin).unwrap();
            prop_assert!(buy_fixed.sell > amount * rate);
            // rate is sell-per-buy here, so the customer pays more sell per buy
            prop_assert!(buy_fixed.sell / buy_fixed.buy > rate);
        }
    }
}
