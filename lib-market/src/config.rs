//! Factory Configuration
//!
//! All pricing-policy knobs live here as configuration, not literals: the
//! fee percentages and the curve shape are policy choices layered on top of
//! the ledger math.

use lib_curve::CurveType;
use lib_types::{Amount, Bps, MAX_BPS};
use serde::{Deserialize, Serialize};

use crate::errors::{MarketError, MarketResult};

/// Factory-wide policy parameters
///
/// A market snapshots `curve` and `supply_cap` at creation time; later
/// config changes never reprice an existing market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Fixed payment required to create a market, in the smallest value
    /// denomination. Must be matched exactly.
    pub creation_fee: Amount,
    /// Maximum units a market's curve will ever sell
    pub supply_cap: Amount,
    /// Fee charged on every trade, in basis points of the traded value.
    /// Charged on top of the cost on buys and out of the refund on sells,
    /// so the reserve always holds exactly the curve integral.
    pub trade_fee_bps: Bps,
    /// Share of every fee routed to the referral when one is supplied,
    /// in basis points of the fee; the remainder accrues to the admin.
    pub referral_share_bps: Bps,
    /// Pricing curve for newly created markets
    pub curve: CurveType,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            // 0.0002 value units at 18 decimals
            creation_fee: 200_000_000_000_000,
            supply_cap: 1_000_000_000,
            trade_fee_bps: 100,           // 1%
            referral_share_bps: 5_000,    // 50% of the fee
            curve: CurveType::Linear {
                base_price: 1_000,
                slope: 2_000,
            },
        }
    }
}

impl FactoryConfig {
    /// Create params for testing: tiny fee, fee-free trades
    pub fn for_testing() -> Self {
        Self {
            creation_fee: 200,
            supply_cap: 1_000_000_000,
            trade_fee_bps: 0,
            referral_share_bps: 5_000,
            curve: CurveType::Linear {
                base_price: 1_000,
                slope: 2_000,
            },
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> MarketResult<()> {
        if self.trade_fee_bps > MAX_BPS {
            return Err(MarketError::InvalidConfig(format!(
                "trade_fee_bps {} exceeds {}",
                self.trade_fee_bps, MAX_BPS
            )));
        }
        if self.referral_share_bps > MAX_BPS {
            return Err(MarketError::InvalidConfig(format!(
                "referral_share_bps {} exceeds {}",
                self.referral_share_bps, MAX_BPS
            )));
        }
        if self.supply_cap == 0 {
            return Err(MarketError::InvalidConfig(
                "supply_cap must be non-zero".to_string(),
            ));
        }
        self.curve.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(FactoryConfig::default().validate().is_ok());
        assert!(FactoryConfig::for_testing().validate().is_ok());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let config = FactoryConfig {
            supply_cap: 0,
            ..FactoryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MarketError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_curve_rejected() {
        let config = FactoryConfig {
            curve: CurveType::Linear {
                base_price: 0,
                slope: 1,
            },
            ..FactoryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
