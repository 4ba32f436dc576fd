//! Golden Vector Tests for Curve Pricing
//!
//! These tests define EXACT expected costs for specific inputs. If any of
//! these tests fail, the pricing policy has changed and every market ledger
//! priced under the old policy is incompatible.
//!
//! # Updating Golden Vectors
//!
//! If you need to change the pricing math:
//! 1. Update the curve computation code
//! 2. Update these golden vectors with new expected values
//! 3. Document the change in the commit message

use crate::CurveType;

/// Default factory curve: unit k costs 1000 + 2000k
const DEFAULT_LINEAR: CurveType = CurveType::Linear {
    base_price: 1_000,
    slope: 2_000,
};

/// Golden vector: reserve potential of the default linear curve
///
/// reserve_at(s) = 1000*s + 2000 * s(s+1)/2
/// - s = 500_000: 1000*500_000 + 2000 * 500_000*500_001/2
///              = 500_000_000 + 250_000_500_000_000
///              = 250_001_000_000_000
#[test]
fn golden_linear_reserve_potential() {
    assert_eq!(DEFAULT_LINEAR.reserve_at(0).unwrap(), 0);
    assert_eq!(DEFAULT_LINEAR.reserve_at(1).unwrap(), 3_000);
    assert_eq!(DEFAULT_LINEAR.reserve_at(10).unwrap(), 120_000);
    assert_eq!(
        DEFAULT_LINEAR.reserve_at(500_000).unwrap(),
        250_001_000_000_000
    );
}

/// Golden vector: the lifecycle scenario trade, 500_000 units from zero supply
///
/// buy_cost(0, 500_000) = reserve_at(500_000) - reserve_at(0)
///                      = 250_001_000_000_000
#[test]
fn golden_linear_scenario_buy() {
    assert_eq!(
        DEFAULT_LINEAR.buy_cost(0, 500_000).unwrap(),
        250_001_000_000_000
    );
    // Selling the same amount back refunds exactly the cost
    assert_eq!(
        DEFAULT_LINEAR.sell_refund(500_000, 500_000).unwrap(),
        250_001_000_000_000
    );
}

/// Golden vector: buying on top of existing supply
///
/// buy_cost(500_000, 300_000) = reserve_at(800_000) - reserve_at(500_000)
/// - reserve_at(800_000) = 1000*800_000 + 2000 * 800_000*800_001/2
///                       = 800_000_000 + 640_000_800_000_000
///                       = 640_001_600_000_000
/// - cost = 640_001_600_000_000 - 250_001_000_000_000 = 390_000_600_000_000
#[test]
fn golden_linear_stacked_buy() {
    assert_eq!(
        DEFAULT_LINEAR.buy_cost(500_000, 300_000).unwrap(),
        390_000_600_000_000
    );
}

/// Golden vector: quadratic curve, unit k costs 7 + 3k^2
///
/// reserve_at(s) = 7s + 3 * s(s+1)(2s+1)/6
/// - s = 10: 70 + 3 * 10*11*21/6 = 70 + 3*385 = 1_225
/// - s = 1000: 7_000 + 3 * 1000*1001*2001/6 = 7_000 + 1_001_500_500
///           = 1_001_507_500
#[test]
fn golden_quadratic_reserve_potential() {
    let curve = CurveType::Quadratic {
        base_price: 7,
        coefficient: 3,
    };
    assert_eq!(curve.reserve_at(10).unwrap(), 1_225);
    assert_eq!(curve.reserve_at(1_000).unwrap(), 1_001_507_500);
    assert_eq!(curve.buy_cost(10, 990).unwrap(), 1_001_507_500 - 1_225);
}
