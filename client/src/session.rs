//! Quote session state machine.
//!
//! A session is Stale (no quote), Fetching (a pricing call is in flight) or
//! Valid (a quote is held and not yet expired). [`QuoteSession::apply`] is the
//! only way state changes: it takes one [`SessionEvent`], updates the state and
//! returns the [`Effect`]s the runtime must carry out. Time only enters through
//! event payloads, so every transition can be exercised without a runtime.

use std::time::Duration;

use fxquote_common::{Currency, FixedSide, PricedQuote, QuoteRequest};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::debug;

use crate::config::SessionConfig;

/// Keep digits and the first decimal point, drop everything else.
pub fn sanitize_amount(raw: &str) -> String {
    let mut seen_point = false;
    raw.chars()
        .filter(|c| match c {
            '0'..='9' => true,
            '.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .collect()
}

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Raw text typed into one leg's amount field.
    AmountEdited { side: FixedSide, raw: String },
    /// Currency picked for one leg.
    CurrencyChanged { side: FixedSide, currency: Currency },
    /// Manual retry after a failure.
    RetryRequested,
    /// The debouncer let a fetch through.
    FetchDue,
    /// A pricing call answered.
    FetchSucceeded {
        generation: u64,
        quote: PricedQuote,
        received_at: Instant,
    },
    /// A pricing call failed.
    FetchFailed { generation: u64, message: String },
    /// The expiry timer fired.
    QuoteExpired { at: Instant },
}

/// Work the runtime performs on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the debouncer for a fetch; it answers with [`SessionEvent::FetchDue`].
    RequestFetch,
    /// Issue a pricing call tagged with the generation it prices.
    StartFetch { generation: u64, request: QuoteRequest },
    /// Wake the session with [`SessionEvent::QuoteExpired`] at `deadline`.
    ArmExpiry { deadline: Instant },
    /// Drop any pending expiry wake-up.
    CancelExpiry,
}

/// Lifecycle phase, derived from the state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stale,
    Fetching,
    Valid,
}

/// Raw amount text per leg, as shown in the input fields.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Amounts {
    sell: String,
    buy: String,
}

/// Currency per leg.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Currencies {
    sell: Currency,
    buy: Currency,
}

/// Authoritative state of one quote session.
///
/// Read through [`QuoteSession::phase`] and [`QuoteSession::snapshot`].
#[derive(Debug, Clone)]
pub struct QuoteSession {
    amounts: Amounts,
    currencies: Currencies,
    fixed: FixedSide,
    /// Set only while the displayed amounts are known to be priced.
    quote: Option<PricedQuote>,
    expires_at: Option<Instant>,
    /// Bumped on every edit; responses for an older generation are discarded.
    generation: u64,
    /// Generation of the pricing call currently in flight.
    in_flight: Option<u64>,
    /// A fetch came due while another was in flight.
    fetch_deferred: bool,
    last_error: Option<String>,
    validity: Duration,
}

impl QuoteSession {
    /// Create a Stale session from configuration.
    pub fn new(config: &SessionConfig) -> Self {
        let amount = sanitize_amount(&config.initial_amount);
        let amounts = match config.initial_fixed {
            FixedSide::Sell => Amounts {
                sell: amount,
                buy: String::new(),
            },
            FixedSide::Buy => Amounts {
                sell: String::new(),
                buy: amount,
            },
        };

        Self {
            amounts,
            currencies: Currencies {
                sell: config.initial_sell.clone(),
                buy: config.initial_buy.clone(),
            },
            fixed: config.initial_fixed,
            quote: None,
            expires_at: None,
            generation: 0,
            in_flight: None,
            fetch_deferred: false,
            last_error: None,
            validity: config.quote_validity,
        }
    }

    /// Effects of entering the initial Stale state.
    pub fn start(&self) -> Vec<Effect> {
        self.stale_entry_effects()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        if self.quote.is_some() {
            Phase::Valid
        } else if self.in_flight.is_some() {
            Phase::Fetching
        } else {
            Phase::Stale
        }
    }

    /// Amount text on the fixed leg.
    fn fixed_amount(&self) -> &str {
        match self.fixed {
            FixedSide::Sell => &self.amounts.sell,
            FixedSide::Buy => &self.amounts.buy,
        }
    }

    /// Whether the current inputs can be priced at all.
    ///
    /// A same-currency conversion is meaningless, and an empty field means the
    /// user cleared it rather than asked for a price.
    fn is_quotable(&self) -> bool {
        self.currencies.sell != self.currencies.buy && !self.fixed_amount().is_empty()
    }

    /// The request the current inputs describe.
    fn request(&self) -> QuoteRequest {
        QuoteRequest::new(
            self.currencies.sell.clone(),
            self.currencies.buy.clone(),
            self.fixed_amount(),
            self.fixed,
        )
    }

    /// Apply one event and return the effects to run.
    pub fn apply(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::AmountEdited { side, raw } => {
                let amount = sanitize_amount(&raw);
                match side {
                    FixedSide::Sell => self.amounts.sell = amount,
                    FixedSide::Buy => self.amounts.buy = amount,
                }
                self.fixed = side;
                self.invalidate()
            }
            SessionEvent::CurrencyChanged { side, currency } => {
                match side {
                    FixedSide::Sell => self.currencies.sell = currency,
                    FixedSide::Buy => self.currencies.buy = currency,
                }
                self.fixed = side;
                self.invalidate()
            }
            SessionEvent::RetryRequested => {
                if self.phase() != Phase::Stale || !self.is_quotable() {
                    return Vec::new();
                }
                self.last_error = None;
                vec![Effect::RequestFetch]
            }
            SessionEvent::FetchDue => self.on_fetch_due(),
            SessionEvent::FetchSucceeded {
                generation,
                quote,
                received_at,
            } => self.on_fetch_succeeded(generation, quote, received_at),
            SessionEvent::FetchFailed {
                generation,
                message,
            } => self.on_fetch_failed(generation, message),
            SessionEvent::QuoteExpired { at } => self.on_expired(at),
        }
    }

    /// Snapshot for the presentation layer.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            sell_amount: self.amounts.sell.clone(),
            buy_amount: self.amounts.buy.clone(),
            sell: self.currencies.sell.clone(),
            buy: self.currencies.buy.clone(),
            fixed: self.fixed,
            conversion_rate: self.quote.as_ref().map(|q| q.conversion_rate),
            loading: self.in_flight.is_some(),
            expires_at: self.expires_at,
            last_error: self.last_error.clone(),
        }
    }

    /// Any edit: drop the quote, start a new generation, re-enter Stale.
    fn invalidate(&mut self) -> Vec<Effect> {
        self.generation += 1;
        self.quote = None;
        self.last_error = None;

        let mut effects = Vec::new();
        if self.expires_at.take().is_some() {
            effects.push(Effect::CancelExpiry);
        }
        effects.extend(self.stale_entry_effects());
        effects
    }

    fn stale_entry_effects(&self) -> Vec<Effect> {
        if self.is_quotable() {
            vec![Effect::RequestFetch]
        } else {
            Vec::new()
        }
    }

    fn on_fetch_due(&mut self) -> Vec<Effect> {
        if self.quote.is_some() || !self.is_quotable() {
            return Vec::new();
        }

        if self.in_flight.is_some() {
            // One call at a time; retried once the current one settles.
            self.fetch_deferred = true;
            return Vec::new();
        }

        self.in_flight = Some(self.generation);
        vec![Effect::StartFetch {
            generation: self.generation,
            request: self.request(),
        }]
    }

    fn on_fetch_succeeded(
        &mut self,
        generation: u64,
        quote: PricedQuote,
        received_at: Instant,
    ) -> Vec<Effect> {
        self.in_flight = None;

        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Discarding quote for superseded inputs"
            );
            return self.settle_deferred();
        }

        self.fetch_deferred = false;
        self.last_error = None;
        self.amounts.sell = quote.sell.value.to_string();
        self.amounts.buy = quote.buy.value.to_string();

        let deadline = received_at + self.validity;
        self.expires_at = Some(deadline);
        self.quote = Some(quote);

        vec![Effect::ArmExpiry { deadline }]
    }

    fn on_fetch_failed(&mut self, generation: u64, message: String) -> Vec<Effect> {
        self.in_flight = None;

        if generation != self.generation {
            debug!(generation, error = %message, "Ignoring failure for superseded inputs");
            return self.settle_deferred();
        }

        // No automatic retry: the next edit or an explicit retry re-triggers.
        self.fetch_deferred = false;
        self.last_error = Some(message);
        Vec::new()
    }

    fn on_expired(&mut self, at: Instant) -> Vec<Effect> {
        if self.in_flight.is_some() {
            // The incoming quote arms a fresh timer.
            return Vec::new();
        }

        match self.expires_at {
            Some(deadline) if deadline <= at => {
                self.quote = None;
                self.expires_at = None;
                self.stale_entry_effects()
            }
            _ => Vec::new(),
        }
    }

    fn settle_deferred(&mut self) -> Vec<Effect> {
        if std::mem::take(&mut self.fetch_deferred) && self.phase() == Phase::Stale {
            self.stale_entry_effects()
        } else {
            Vec::new()
        }
    }
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub sell_amount: String,
    pub buy_amount: String,
    pub sell: Currency,
    pub buy: Currency,
    pub fixed: FixedSide,
    /// Present only while a valid quote is held.
    pub conversion_rate: Option<Decimal>,
    /// A pricing call is in flight.
    pub loading: bool,
    pub expires_at: Option<Instant>,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// Time left before the quote expires.
    pub fn expires_in(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Countdown in whole seconds, rounded to nearest, for display.
    pub fn countdown_secs(&self, now: Instant) -> Option<u64> {
        self.expires_in(now)
            .map(|remaining| (remaining.as_millis() as u64 + 500) / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxquote_common::Money;
    use rust_decimal_macros::dec;

    fn session() -> QuoteSession {
        QuoteSession::new(&SessionConfig::default())
    }

    fn quote(sell: Decimal, buy: Decimal) -> PricedQuote {
        PricedQuote {
            mid_market_rate: dec!(0.65),
            conversion_rate: dec!(0.6468),
            fixed_side: FixedSide::Sell,
            buy: Money::new(buy, Currency::usd()),
            sell: Money::new(sell, Currency::aud()),
        }
    }

    /// Drive a session from Stale to Valid and return the receive time.
    fn make_valid(session: &mut QuoteSession) -> Instant {
        let effects = session.apply(SessionEvent::FetchDue);
        assert!(matches!(effects.as_slice(), [Effect::StartFetch { .. }]));

        let at = Instant::now();
        session.apply(SessionEvent::FetchSucceeded {
            generation: session.generation,
            quote: quote(dec!(1000.00), dec!(646.75)),
            received_at: at,
        });
        at
    }

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount("1,000.50"), "1000.50");
        assert_eq!(sanitize_amount("12..5"), "12.5");
        assert_eq!(sanitize_amount("1.2.3"), "1.23");
        assert_eq!(sanitize_amount("$ 45"), "45");
        assert_eq!(sanitize_amount("abc"), "");
    }

    #[test]
    fn test_initial_state_requests_fetch() {
        let session = session();
        assert_eq!(session.phase(), Phase::Stale);
        assert_eq!(session.amounts.sell, "1000");
        assert_eq!(session.start(), vec![Effect::RequestFetch]);
    }

    #[test]
    fn test_same_currency_never_fetches() {
        let config = SessionConfig {
            initial_buy: Currency::aud(),
            ..Default::default()
        };
        let mut session = QuoteSession::new(&config);

        assert!(session.start().is_empty());
        assert!(session.apply(SessionEvent::FetchDue).is_empty());
        assert!(session
            .apply(SessionEvent::AmountEdited {
                side: FixedSide::Sell,
                raw: "50".into(),
            })
            .is_empty());
        assert_eq!(session.phase(), Phase::Stale);
    }

    #[test]
    fn test_currency_change_to_same_currency_stops_fetching() {
        let mut session = session();
        let effects = session.apply(SessionEvent::CurrencyChanged {
            side: FixedSide::Buy,
            currency: Currency::aud(),
        });
        assert!(effects.is_empty());
        assert_eq!(session.fixed, FixedSide::Buy);
    }

    #[test]
    fn test_fetch_due_starts_tagged_fetch() {
        let mut session = session();
        let effects = session.apply(SessionEvent::FetchDue);

        assert_eq!(
            effects,
            vec![Effect::StartFetch {
                generation: 0,
                request: QuoteRequest::new(Currency::aud(), Currency::usd(), "1000", FixedSide::Sell),
            }]
        );
        assert_eq!(session.phase(), Phase::Fetching);
        assert!(session.snapshot().loading);
    }

    #[test]
    fn test_success_sets_quote_and_expiry() {
        let mut session = session();
        let at = make_valid(&mut session);

        assert_eq!(session.phase(), Phase::Valid);
        assert_eq!(session.expires_at, Some(at + Duration::from_secs(30)));
        assert_eq!(session.amounts.sell, "1000.00");
        assert_eq!(session.amounts.buy, "646.75");
        assert_eq!(session.snapshot().conversion_rate, Some(dec!(0.6468)));
    }

    #[test]
    fn test_success_arms_expiry() {
        let mut session = session();
        session.apply(SessionEvent::FetchDue);
        let at = Instant::now();
        let effects = session.apply(SessionEvent::FetchSucceeded {
            generation: 0,
            quote: quote(dec!(1000.00), dec!(646.75)),
            received_at: at,
        });
        assert_eq!(
            effects,
            vec![Effect::ArmExpiry {
                deadline: at + Duration::from_secs(30)
            }]
        );
    }

    #[test]
    fn test_edit_clears_quote_before_fetching() {
        let mut session = session();
        make_valid(&mut session);

        let effects = session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Buy,
            raw: "500".into(),
        });

        assert!(session.quote.is_none());
        assert!(session.expires_at.is_none());
        assert_eq!(session.fixed, FixedSide::Buy);
        assert_eq!(session.amounts.buy, "500");
        assert_eq!(effects, vec![Effect::CancelExpiry, Effect::RequestFetch]);
    }

    #[test]
    fn test_expiry_returns_to_stale_and_requotes() {
        let mut session = session();
        let at = make_valid(&mut session);

        let early = session.apply(SessionEvent::QuoteExpired {
            at: at + Duration::from_secs(10),
        });
        assert!(early.is_empty());
        assert_eq!(session.phase(), Phase::Valid);

        let effects = session.apply(SessionEvent::QuoteExpired {
            at: at + Duration::from_secs(30),
        });
        assert_eq!(effects, vec![Effect::RequestFetch]);
        assert!(session.quote.is_none());
    }

    #[test]
    fn test_expiry_ignored_while_fetching() {
        let mut session = session();
        let at = make_valid(&mut session);

        let effects = session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Sell,
            raw: "2000".into(),
        });
        assert_eq!(effects, vec![Effect::CancelExpiry, Effect::RequestFetch]);
        session.apply(SessionEvent::FetchDue);
        assert_eq!(session.phase(), Phase::Fetching);

        // Timer message already queued before the cancel landed
        let effects = session.apply(SessionEvent::QuoteExpired {
            at: at + Duration::from_secs(30),
        });
        assert!(effects.is_empty());
        assert_eq!(session.phase(), Phase::Fetching);
        assert_eq!(session.in_flight, Some(1));
    }

    #[test]
    fn test_stale_expiry_does_not_drop_newer_quote() {
        let mut session = session();
        let first = make_valid(&mut session);

        session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Sell,
            raw: "2000".into(),
        });
        session.apply(SessionEvent::FetchDue);
        let second = first + Duration::from_secs(12);
        session.apply(SessionEvent::FetchSucceeded {
            generation: 1,
            quote: quote(dec!(2000.00), dec!(1293.50)),
            received_at: second,
        });
        assert_eq!(session.phase(), Phase::Valid);

        let effects = session.apply(SessionEvent::QuoteExpired {
            at: first + Duration::from_secs(30),
        });
        assert!(effects.is_empty());
        assert_eq!(session.phase(), Phase::Valid);
        assert_eq!(session.expires_at, Some(second + Duration::from_secs(30)));
    }

    #[test]
    fn test_late_response_is_discarded() {
        let mut session = session();
        session.apply(SessionEvent::FetchDue);
        let stale_generation = session.generation;

        session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Sell,
            raw: "2500".into(),
        });

        let effects = session.apply(SessionEvent::FetchSucceeded {
            generation: stale_generation,
            quote: quote(dec!(1000.00), dec!(646.75)),
            received_at: Instant::now(),
        });

        assert!(effects.is_empty());
        assert!(session.quote.is_none());
        assert_eq!(session.amounts.sell, "2500");
        assert_eq!(session.amounts.buy, "");
        assert_eq!(session.phase(), Phase::Stale);
    }

    #[test]
    fn test_fetch_due_while_in_flight_is_deferred() {
        let mut session = session();
        session.apply(SessionEvent::FetchDue);
        let first = session.generation;

        session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Sell,
            raw: "2500".into(),
        });
        assert!(session.apply(SessionEvent::FetchDue).is_empty());
        assert!(session.fetch_deferred);

        let effects = session.apply(SessionEvent::FetchFailed {
            generation: first,
            message: "boom".into(),
        });
        assert_eq!(effects, vec![Effect::RequestFetch]);
        assert!(session.last_error.is_none());

        let effects = session.apply(SessionEvent::FetchDue);
        assert_eq!(
            effects,
            vec![Effect::StartFetch {
                generation: first + 1,
                request: QuoteRequest::new(Currency::aud(), Currency::usd(), "2500", FixedSide::Sell),
            }]
        );
    }

    #[test]
    fn test_failure_stays_stale_without_retry() {
        let mut session = session();
        session.apply(SessionEvent::FetchDue);

        let effects = session.apply(SessionEvent::FetchFailed {
            generation: 0,
            message: "Pricing failed (500)".into(),
        });

        assert!(effects.is_empty());
        assert_eq!(session.phase(), Phase::Stale);
        let snapshot = session.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.last_error.as_deref(), Some("Pricing failed (500)"));

        assert_eq!(session.apply(SessionEvent::RetryRequested), vec![Effect::RequestFetch]);
        assert!(session.last_error.is_none());
    }

    #[test]
    fn test_retry_ignored_when_valid() {
        let mut session = session();
        make_valid(&mut session);
        assert!(session.apply(SessionEvent::RetryRequested).is_empty());
    }

    #[test]
    fn test_empty_amount_does_not_fetch() {
        let mut session = session();
        let effects = session.apply(SessionEvent::AmountEdited {
            side: FixedSide::Sell,
            raw: "".into(),
        });
        assert!(effects.is_empty());
    }

    #[test]
    fn test_countdown() {
        let mut session = session();
        let at = make_valid(&mut session);
        let snapshot = session.snapshot();

        assert_eq!(snapshot.countdown_secs(at), Some(30));
        assert_eq!(snapshot.countdown_secs(at + Duration::from_millis(10_400)), Some(20));
        assert_eq!(snapshot.countdown_secs(at + Duration::from_secs(30)), None);
    }
}
