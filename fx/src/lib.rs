//! FxQuote Rate Normalizer & Pricer
//!
//! Turns an upstream mid-market rate into a retail quote.
//!
//! # Features
//!
//! - Pluggable rate providers behind [`RateProvider`]
//! - HTTP provider for the public mid-market rate endpoint
//! - Pair orientation normalization
//! - Markup applied in the direction that favors the house
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fxquote_fx::{HttpRateProvider, Pricer, PricerConfig, UpstreamConfig};
//! use fxquote_common::{Currency, FixedSide, QuoteRequest};
//!
//! let provider = Arc::new(HttpRateProvider::new(UpstreamConfig::default()));
//! let pricer = Pricer::new(provider, PricerConfig::default());
//!
//! let request = QuoteRequest::new(Currency::aud(), Currency::usd(), "1000", FixedSide::Sell);
//! let quote = pricer.price(&request).await?;
//! ```

pub mod engine;
pub mod provider;
pub mod upstream;
pub mod conversion;

pub use engine::{Pricer, PricerConfig};
pub use provider::RateProvider;
pub use upstream::{HttpRateProvider, UpstreamConfig};
pub use conversion::{apply_markup, normalize_mid_market_rate, Legs};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
