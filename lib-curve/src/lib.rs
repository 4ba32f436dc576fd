//! Bonding-Curve Pricing
//!
//! Pure, deterministic trade pricing for the launchpad engine.
//!
//! # Design Principles
//!
//! 1. **Pure functions** - No side effects, no global state
//! 2. **Deterministic** - Same inputs produce identical outputs across all platforms
//! 3. **No floats** - All arithmetic uses u128 integers
//! 4. **Overflow-safe** - Uses checked arithmetic everywhere
//!
//! # Exactness
//!
//! Every cost is the difference of a single *reserve potential*: the exact
//! value a market's reserve must hold at a given supply. Because buys and
//! sells both price against the same potential, conservation and the
//! round-trip law (`sell_refund(s, a) == buy_cost(s - a, a)`) hold by
//! construction, for every curve shape.
//!
//! # Usage
//!
//! ```
//! use lib_curve::CurveType;
//!
//! let curve = CurveType::Linear { base_price: 1_000, slope: 2_000 };
//! let cost = curve.buy_cost(0, 10).unwrap();
//! let refund = curve.sell_refund(10, 10).unwrap();
//! assert_eq!(cost, refund);
//! ```

pub mod curve;

#[cfg(test)]
mod golden_vectors;

pub use curve::{CurveError, CurveResult, CurveType};
