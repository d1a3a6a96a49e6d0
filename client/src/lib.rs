//! FxQuote Client Library
//!
//! Owns the lifecycle of a quote in an interactive session: which inputs are
//! authoritative, when a new quote is fetched, how long it stays valid, and
//! how edits interact with a fetch that is still in flight.
//!
//! The session itself is a plain reducer ([`QuoteSession`]); the
//! [`controller`] runs it on a tokio task with timers and a transport.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod schedule;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, SessionConfig};
pub use controller::{spawn_session, QuoteHandle};
pub use error::{ClientError, ClientResult};
pub use session::{Effect, QuoteSession, SessionEvent, SessionSnapshot};
pub use transport::{HttpQuoteTransport, QuoteTransport};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;
