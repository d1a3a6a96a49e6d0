//! FxQuote Common Types
//!
//! This crate contains the data contract shared by the pricing server and the
//! quote client: currencies, money amounts, quote requests and priced quotes,
//! the quote error taxonomy and timing constants.

pub mod identifiers;
pub mod monetary;
pub mod quote;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use monetary::*;
pub use quote::*;
pub use error::*;
pub use time::*;
