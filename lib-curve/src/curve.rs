//! Curve Shapes and the Reserve Potential
//!
//! A curve assigns a price to every unit by its position in the cumulative
//! supply: unit `k` (1-indexed) of a linear curve costs
//! `base_price + slope * k`. The *reserve potential* `reserve_at(s)` is the
//! exact sum of the first `s` unit prices, and every trade is priced as a
//! difference of potentials:
//!
//! - `buy_cost(s, a)    = reserve_at(s + a) - reserve_at(s)`
//! - `sell_refund(s, a) = reserve_at(s) - reserve_at(s - a)`
//!
//! The closed forms below (`s(s+1)/2`, `s(s+1)(2s+1)/6`) are exact in
//! integer arithmetic, so no rounding can create or destroy value and a
//! purchase split into arbitrary chunks costs the same as one purchase.

use lib_types::Amount;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error during curve pricing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("Zero amount not allowed")]
    ZeroAmount,

    #[error("Sell amount {amount} exceeds supply sold {supply_sold}")]
    AmountExceedsSupply { amount: Amount, supply_sold: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid curve parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for curve operations
pub type CurveResult<T> = Result<T, CurveError>;

/// Bonding-curve pricing formula
///
/// The concrete shape is a pricing-policy choice; the engine only relies on
/// the potential-difference contract, so shapes are swappable here without
/// touching the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    /// Linear: unit k costs `base_price + slope * k`
    Linear {
        /// Price of the hypothetical zeroth unit (smallest value denomination)
        base_price: Amount,
        /// Price increase per unit sold
        slope: Amount,
    },
    /// Quadratic: unit k costs `base_price + coefficient * k^2`
    Quadratic {
        /// Price floor per unit (smallest value denomination)
        base_price: Amount,
        /// Quadratic growth coefficient
        coefficient: Amount,
    },
}

impl CurveType {
    /// Validate curve parameters
    ///
    /// A zero base price would let the first units trade for nothing, which
    /// the engine forbids (a buy must never cost zero).
    pub fn validate(&self) -> CurveResult<()> {
        let base_price = match self {
            CurveType::Linear { base_price, .. } => *base_price,
            CurveType::Quadratic { base_price, .. } => *base_price,
        };
        if base_price == 0 {
            return Err(CurveError::InvalidParameters(
                "base_price must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get display name for the curve shape
    pub fn name(&self) -> &'static str {
        match self {
            CurveType::Linear { .. } => "linear",
            CurveType::Quadratic { .. } => "quadratic",
        }
    }

    /// The exact reserve backing `supply` units sold
    ///
    /// Sum of the first `supply` unit prices, in closed form:
    /// - Linear:    `base*s + slope * s(s+1)/2`
    /// - Quadratic: `base*s + coeff * s(s+1)(2s+1)/6`
    pub fn reserve_at(&self, supply: Amount) -> CurveResult<Amount> {
        match *self {
            CurveType::Linear { base_price, slope } => {
                let base = base_price.checked_mul(supply).ok_or(CurveError::Overflow)?;
                let tri = triangular(supply)?;
                let sloped = slope.checked_mul(tri).ok_or(CurveError::Overflow)?;
                base.checked_add(sloped).ok_or(CurveError::Overflow)
            }
            CurveType::Quadratic {
                base_price,
                coefficient,
            } => {
                let base = base_price.checked_mul(supply).ok_or(CurveError::Overflow)?;
                let pyr = square_pyramidal(supply)?;
                let curved = coefficient.checked_mul(pyr).ok_or(CurveError::Overflow)?;
                base.checked_add(curved).ok_or(CurveError::Overflow)
            }
        }
    }

    /// Price of the next unit at the given supply
    pub fn unit_price(&self, supply: Amount) -> CurveResult<Amount> {
        let next = supply.checked_add(1).ok_or(CurveError::Overflow)?;
        match *self {
            CurveType::Linear { base_price, slope } => slope
                .checked_mul(next)
                .and_then(|v| v.checked_add(base_price))
                .ok_or(CurveError::Overflow),
            CurveType::Quadratic {
                base_price,
                coefficient,
            } => next
                .checked_mul(next)
                .and_then(|sq| coefficient.checked_mul(sq))
                .and_then(|v| v.checked_add(base_price))
                .ok_or(CurveError::Overflow),
        }
    }

    /// Exact cost to buy `amount` units at `supply_sold` units already sold
    ///
    /// Strictly increasing in `amount`, non-decreasing in `supply_sold`,
    /// and never zero for a non-zero amount on a validated curve.
    pub fn buy_cost(&self, supply_sold: Amount, amount: Amount) -> CurveResult<Amount> {
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        let end = supply_sold.checked_add(amount).ok_or(CurveError::Overflow)?;
        let after = self.reserve_at(end)?;
        let before = self.reserve_at(supply_sold)?;
        after.checked_sub(before).ok_or(CurveError::Overflow)
    }

    /// Exact refund for selling `amount` units at `supply_sold` units sold
    ///
    /// The inverse of `buy_cost` over the same supply range:
    /// `sell_refund(s, a) == buy_cost(s - a, a)`.
    pub fn sell_refund(&self, supply_sold: Amount, amount: Amount) -> CurveResult<Amount> {
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        if amount > supply_sold {
            return Err(CurveError::AmountExceedsSupply {
                amount,
                supply_sold,
            });
        }
        let before = self.reserve_at(supply_sold)?;
        let after = self.reserve_at(supply_sold - amount)?;
        before.checked_sub(after).ok_or(CurveError::Overflow)
    }
}

/// s(s+1)/2, exact (the product is always even)
fn triangular(s: Amount) -> CurveResult<Amount> {
    let next = s.checked_add(1).ok_or(CurveError::Overflow)?;
    // Divide the even factor first so the intermediate fits whenever the
    // result does.
    if s % 2 == 0 {
        (s / 2).checked_mul(next).ok_or(CurveError::Overflow)
    } else {
        s.checked_mul(next / 2).ok_or(CurveError::Overflow)
    }
}

/// s(s+1)(2s+1)/6, exact (the product is always divisible by 6)
fn square_pyramidal(s: Amount) -> CurveResult<Amount> {
    let next = s.checked_add(1).ok_or(CurveError::Overflow)?;
    let odd = s
        .checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or(CurveError::Overflow)?;
    s.checked_mul(next)
        .and_then(|v| v.checked_mul(odd))
        .map(|v| v / 6)
        .ok_or(CurveError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> CurveType {
        CurveType::Linear {
            base_price: 1_000,
            slope: 2_000,
        }
    }

    fn quadratic() -> CurveType {
        CurveType::Quadratic {
            base_price: 1_000,
            coefficient: 3,
        }
    }

    #[test]
    fn test_validate_rejects_zero_base_price() {
        let curve = CurveType::Linear {
            base_price: 0,
            slope: 1,
        };
        assert!(matches!(
            curve.validate(),
            Err(CurveError::InvalidParameters(_))
        ));

        assert!(linear().validate().is_ok());
        assert!(quadratic().validate().is_ok());
    }

    #[test]
    fn test_reserve_at_zero_supply() {
        assert_eq!(linear().reserve_at(0).unwrap(), 0);
        assert_eq!(quadratic().reserve_at(0).unwrap(), 0);
    }

    #[test]
    fn test_linear_first_units() {
        // Unit 1 costs 1000 + 2000*1 = 3000, unit 2 costs 5000
        let curve = linear();
        assert_eq!(curve.buy_cost(0, 1).unwrap(), 3_000);
        assert_eq!(curve.buy_cost(1, 1).unwrap(), 5_000);
        assert_eq!(curve.buy_cost(0, 2).unwrap(), 8_000);
    }

    #[test]
    fn test_quadratic_first_units() {
        // Unit 1 costs 1000 + 3*1 = 1003, unit 2 costs 1000 + 3*4 = 1012
        let curve = quadratic();
        assert_eq!(curve.buy_cost(0, 1).unwrap(), 1_003);
        assert_eq!(curve.buy_cost(1, 1).unwrap(), 1_012);
        assert_eq!(curve.buy_cost(0, 2).unwrap(), 2_015);
    }

    #[test]
    fn test_zero_amount_rejected() {
        assert_eq!(linear().buy_cost(10, 0), Err(CurveError::ZeroAmount));
        assert_eq!(linear().sell_refund(10, 0), Err(CurveError::ZeroAmount));
    }

    #[test]
    fn test_sell_above_supply_rejected() {
        assert_eq!(
            linear().sell_refund(5, 6),
            Err(CurveError::AmountExceedsSupply {
                amount: 6,
                supply_sold: 5
            })
        );
    }

    #[test]
    fn test_round_trip_law() {
        for curve in [linear(), quadratic()] {
            for supply in [0u128, 1, 17, 500_000, 1_000_000_000] {
                for amount in [1u128, 2, 999, 500_000] {
                    let cost = curve.buy_cost(supply, amount).unwrap();
                    let refund = curve.sell_refund(supply + amount, amount).unwrap();
                    assert_eq!(cost, refund, "{} s={} a={}", curve.name(), supply, amount);
                }
            }
        }
    }

    #[test]
    fn test_path_independence() {
        // Buying 700 then 300 costs exactly what buying 1000 costs
        for curve in [linear(), quadratic()] {
            let split = curve.buy_cost(0, 700).unwrap() + curve.buy_cost(700, 300).unwrap();
            let whole = curve.buy_cost(0, 1_000).unwrap();
            assert_eq!(split, whole);
        }
    }

    #[test]
    fn test_monotonic_in_amount() {
        let curve = linear();
        let mut prev = 0;
        for amount in 1..100u128 {
            let cost = curve.buy_cost(1_000, amount).unwrap();
            assert!(cost > prev);
            prev = cost;
        }
    }

    #[test]
    fn test_monotonic_in_supply() {
        for curve in [linear(), quadratic()] {
            let mut prev = 0;
            for supply in (0..100_000u128).step_by(7_919) {
                let cost = curve.buy_cost(supply, 1_000).unwrap();
                assert!(cost >= prev);
                prev = cost;
            }
        }
    }

    #[test]
    fn test_cost_never_zero() {
        for curve in [linear(), quadratic()] {
            assert!(curve.buy_cost(0, 1).unwrap() > 0);
        }
    }

    #[test]
    fn test_conservation_against_unit_prices() {
        // reserve_at(s) equals the sum of the first s unit prices
        for curve in [linear(), quadratic()] {
            let mut summed = 0u128;
            for supply in 0..200u128 {
                assert_eq!(curve.reserve_at(supply).unwrap(), summed);
                summed += curve.unit_price(supply).unwrap();
            }
        }
    }

    #[test]
    fn test_overflow_reported() {
        let curve = CurveType::Linear {
            base_price: Amount::MAX,
            slope: Amount::MAX,
        };
        assert_eq!(curve.buy_cost(0, 2), Err(CurveError::Overflow));
        assert_eq!(
            linear().buy_cost(Amount::MAX, 1),
            Err(CurveError::Overflow)
        );
    }
}
