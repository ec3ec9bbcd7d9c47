//! Allocator Valuation
//!
//! Per-token price feeds behind the `ValuationAdapter` capability.
//!
//! ## Components
//!
//! - **PriceFeed**: one token's price (value units per whole token), its
//!   decimal scale, and the authority allowed to update it
//! - **PriceTable**: the adapter; maps tokens to feeds and converts
//!   amounts into value units
//!
//! A missing feed or a zero price is reported as `ValuationUnavailable`;
//! the table never substitutes a fallback price.

pub mod state;
pub mod table;

pub use state::PriceFeed;
pub use table::PriceTable;
