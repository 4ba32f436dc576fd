//! Market Ledger
//!
//! One bonding-curve market: immutable metadata plus the two-counter ledger
//! (`supply_sold`, `reserve_balance`). Only `apply_buy` and `apply_sell`
//! mutate the counters, and both follow compute-validate-commit: all
//! arithmetic and checks happen on local values, then both counters are
//! written together. On any error the struct is untouched.
//!
//! # Invariants
//! - `reserve_balance == curve.reserve_at(supply_sold)` at all times
//! - `supply_sold <= supply_cap`
//! - metadata, creator, referral, curve, and cap never change after creation

use lib_curve::CurveType;
use lib_types::{Address, Amount, MarketId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MarketError, MarketResult};

/// Longest symbol the factory accepts
const MAX_SYMBOL_LEN: usize = 10;

/// Market metadata, set once at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMetadata {
    pub name: String,
    pub symbol: String,
    pub image_uri: String,
    pub description: String,
}

impl MarketMetadata {
    pub fn validate(&self) -> MarketResult<()> {
        if self.name.is_empty() {
            return Err(MarketError::InvalidMetadata(
                "name cannot be empty".to_string(),
            ));
        }
        if self.symbol.is_empty() {
            return Err(MarketError::InvalidMetadata(
                "symbol cannot be empty".to_string(),
            ));
        }
        if self.symbol.len() > MAX_SYMBOL_LEN {
            return Err(MarketError::InvalidMetadata(format!(
                "symbol too long (max {})",
                MAX_SYMBOL_LEN
            )));
        }
        Ok(())
    }
}

/// Ledger movement produced by one committed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerDelta {
    /// Units bought or sold
    pub units: Amount,
    /// Exact reserve movement (cost on buy, refund on sell)
    pub reserve_delta: Amount,
    /// Supply sold after the commit
    pub supply_sold_after: Amount,
    /// Reserve balance after the commit
    pub reserve_after: Amount,
}

/// One bonding-curve market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    // === Identity ===
    pub id: MarketId,
    pub metadata: MarketMetadata,
    pub creator: Address,
    pub referral: Option<Address>,

    // === Pricing policy (snapshotted from factory config at creation) ===
    pub curve: CurveType,
    pub supply_cap: Amount,

    // === Ledger ===
    pub supply_sold: Amount,
    pub reserve_balance: Amount,
}

impl Market {
    /// Create a market with an empty ledger
    pub fn create(
        id: MarketId,
        metadata: MarketMetadata,
        curve: CurveType,
        supply_cap: Amount,
        creator: Address,
        referral: Option<Address>,
    ) -> MarketResult<Self> {
        metadata.validate()?;
        curve.validate()?;

        Ok(Self {
            id,
            metadata,
            creator,
            referral: referral.filter(|addr| !addr.is_zero()),
            curve,
            supply_cap,
            supply_sold: 0,
            reserve_balance: 0,
        })
    }

    /// Exact cost to buy `amount` units at the current supply
    ///
    /// Read-only; also enforces the cap so a successful quote guarantees the
    /// matching `apply_buy` cannot fail.
    pub fn quote_buy(&self, amount: Amount) -> MarketResult<Amount> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        let would_have = self
            .supply_sold
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        if would_have > self.supply_cap {
            return Err(MarketError::SupplyCapExceeded {
                cap: self.supply_cap,
                would_have,
            });
        }
        Ok(self.curve.buy_cost(self.supply_sold, amount)?)
    }

    /// Exact refund for selling `amount` units at the current supply
    pub fn quote_sell(&self, amount: Amount) -> MarketResult<Amount> {
        Ok(self.curve.sell_refund(self.supply_sold, amount)?)
    }

    /// Price of the next unit on the curve
    pub fn current_price(&self) -> MarketResult<Amount> {
        Ok(self.curve.unit_price(self.supply_sold)?)
    }

    /// Commit a buy: `supply_sold += amount`, `reserve_balance += cost`
    pub fn apply_buy(&mut self, amount: Amount) -> MarketResult<LedgerDelta> {
        let cost = self.quote_buy(amount)?;
        let new_supply = self
            .supply_sold
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        let new_reserve = self
            .reserve_balance
            .checked_add(cost)
            .ok_or(MarketError::Overflow)?;

        self.supply_sold = new_supply;
        self.reserve_balance = new_reserve;
        debug!(
            market = %self.id,
            units = %amount,
            cost = %cost,
            supply_sold = %new_supply,
            "buy committed"
        );

        Ok(LedgerDelta {
            units: amount,
            reserve_delta: cost,
            supply_sold_after: new_supply,
            reserve_after: new_reserve,
        })
    }

    /// Commit a sell: `supply_sold -= amount`, `reserve_balance -= refund`
    pub fn apply_sell(&mut self, amount: Amount) -> MarketResult<LedgerDelta> {
        let refund = self.quote_sell(amount)?;
        let new_supply = self
            .supply_sold
            .checked_sub(amount)
            .ok_or(MarketError::Overflow)?;
        let new_reserve = self
            .reserve_balance
            .checked_sub(refund)
            .ok_or(MarketError::Overflow)?;

        self.supply_sold = new_supply;
        self.reserve_balance = new_reserve;
        debug!(
            market = %self.id,
            units = %amount,
            refund = %refund,
            supply_sold = %new_supply,
            "sell committed"
        );

        Ok(LedgerDelta {
            units: amount,
            reserve_delta: refund,
            supply_sold_after: new_supply,
            reserve_after: new_reserve,
        })
    }

    /// Verify the ledger against the curve: the reserve must hold exactly
    /// the potential of the supply sold
    pub fn audit(&self) -> MarketResult<()> {
        let expected = self.curve.reserve_at(self.supply_sold)?;
        if self.reserve_balance != expected {
            return Err(MarketError::ConservationViolated(format!(
                "market {:?}: reserve {} != curve potential {} at supply {}",
                self.id, self.reserve_balance, expected, self.supply_sold
            )));
        }
        Ok(())
    }
}
