//! Canonical Primitive Types for the Launchpad Engine
//!
//! These types are the foundational building blocks for all ledger-critical
//! data structures. They are designed to be:
//! - Fixed-size (no dynamic allocation)
//! - Deterministically serializable
//! - Efficient to copy and compare

pub mod primitives;

pub use primitives::{Address, Amount, Bps, MarketId, MAX_BPS};
