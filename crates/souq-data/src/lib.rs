//! Store adapters for the Souq shipping and coupon rules.
//!
//! This crate provides:
//! - `LookupKind` - Store call categories with default timeouts
//! - `TimeoutConfig` - Per-kind lookup timeouts
//! - `TimedStore` - Bounds any store's lookups with those timeouts
//! - `Fixture` - TOML/JSON files loaded into a `MemoryStore`
//! - `parse_cart_json` - JSON cart files

mod cart;
mod fixture;
mod lookup;
mod timed;
mod timeout;

pub use cart::*;
pub use fixture::*;
pub use lookup::*;
pub use timed::*;
pub use timeout::*;
