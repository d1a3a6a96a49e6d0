//! Text rendering of session snapshots.

use fxquote_client::SessionSnapshot;
use fxquote_common::FixedSide;
use tokio::time::Instant;

/// Render a snapshot as a small three line panel.
pub fn render(snapshot: &SessionSnapshot, now: Instant) -> String {
    let marker = |side: FixedSide| if snapshot.fixed == side { "*" } else { " " };

    let rate = snapshot
        .conversion_rate
        .map(|rate| rate.to_string())
        .unwrap_or_else(|| "-".to_string());

    let status = if snapshot.loading {
        "fetching...".to_string()
    } else if let Some(secs) = snapshot.countdown_secs(now) {
        format!("will expire in {}s", secs)
    } else if let Some(error) = &snapshot.last_error {
        format!("{} (type 'retry')", error)
    } else {
        String::new()
    };

    format!(
        "{} You sell  {:>14} {}\n  Conversion rate {}  {}\n{} You buy   {:>14} {}",
        marker(FixedSide::Sell),
        display_amount(&snapshot.sell_amount),
        snapshot.sell,
        rate,
        status,
        marker(FixedSide::Buy),
        display_amount(&snapshot.buy_amount),
        snapshot.buy,
    )
}

fn display_amount(amount: &str) -> &str {
    if amount.is_empty() {
        "-"
    } else {
        amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxquote_common::Currency;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            sell_amount: "1000.00".into(),
            buy_amount: "646.75".into(),
            sell: Currency::aud(),
            buy: Currency::usd(),
            fixed: FixedSide::Sell,
            conversion_rate: Some(dec!(0.6468)),
            loading: false,
            expires_at: None,
            last_error: None,
        }
    }

    #[test]
    fn test_render_valid_quote_with_countdown() {
        let now = Instant::now();
        let snapshot = SessionSnapshot {
            expires_at: Some(now + Duration::from_millis(29_600)),
            ..snapshot()
        };

        let text = render(&snapshot, now);

        assert!(text.contains("Conversion rate 0.6468"));
        assert!(text.contains("will expire in 30s"));
        assert!(text.starts_with("* You sell"));
        assert!(text.contains("646.75 USD"));
    }

    #[test]
    fn test_render_stale_with_error() {
        let snapshot = SessionSnapshot {
            buy_amount: String::new(),
            conversion_rate: None,
            last_error: Some("Pricing failed (500)".into()),
            ..snapshot()
        };

        let text = render(&snapshot, Instant::now());

        assert!(text.contains("Conversion rate -"));
        assert!(text.contains("Pricing failed (500) (type 'retry')"));
        assert!(text.contains("- USD"));
    }

    #[test]
    fn test_render_loading() {
        let snapshot = SessionSnapshot {
            conversion_rate: None,
            loading: true,
            ..snapshot()
        };

        assert!(render(&snapshot, Instant::now()).contains("fetching..."));
    }
}
