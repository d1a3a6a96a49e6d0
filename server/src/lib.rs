//! FxQuote Pricing Server
//!
//! Exposes the retail pricer over HTTP. The endpoint is a thin shell: all
//! pricing decisions live in `fxquote-fx`.

pub mod api;
pub mod config;
pub mod error;
pub mod telemetry;

pub use api::{app_router, AppState};
pub use config::ServerConfig;
