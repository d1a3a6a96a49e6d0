//! Timing constants for the quote lifecycle.

use chrono::Duration;

/// Quote timing constants.
pub mod constants {
    use super::Duration;

    /// How long a priced quote stays valid (30 seconds).
    pub fn quote_validity() -> Duration {
        Duration::seconds(30)
    }

    /// Minimum spacing between pricing calls from one session (5 seconds).
    pub fn requote_spacing() -> Duration {
        Duration::seconds(5)
    }

    /// Timeout for a single upstream rate lookup (10 seconds).
    pub fn upstream_request_timeout() -> Duration {
        Duration::seconds(10)
    }

    /// Timeout for a client call to the pricing endpoint (15 seconds).
    pub fn pricing_request_timeout() -> Duration {
        Duration::seconds(15)
    }
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
