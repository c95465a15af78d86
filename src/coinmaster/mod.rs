//! Coinmaster protocol
//!
//! Merchants that trade tokens for items all behave alike: a form post with
//! an action, an item id and a quantity, and a page showing the remaining
//! token balance. Each merchant is a data record (`CoinmasterConfig`); one
//! protocol engine serves all of them.

pub mod config;
pub mod gate;
pub mod protocol;

pub use config::{CoinmasterConfig, CoinmasterItem, CoinmasterRegistry, FailureMarker, ItemCost};
pub use gate::{ClassAtLevel, Gate};
pub use protocol::{Affordability, CoinmasterProtocol, CoinmasterPurchase};
