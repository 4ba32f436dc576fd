//! Fee Splitting and the Fee Ledger
//!
//! Implements deterministic fee splitting between the factory admin and an
//! optional referral account.
//!
//! The split is a **pure function**: no state, no wallets, no transfers.
//! - Input: traded value (or a whole fee) plus the configured percentages
//! - Output: a `FeeSplit` accounting breakdown
//! - Side effects: none
//!
//! All calculations use integer arithmetic so results are deterministic
//! across platforms. If the referral share produces a remainder under
//! integer division, the remainder is assigned to the admin cut; conservation
//! of value (`admin_cut + referral_cut == total_fee <= value`) is verified
//! when the split is constructed.

use lib_types::{Address, Amount, Bps, MAX_BPS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::{MarketError, MarketResult};

/// Fee accounting breakdown for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Total fee taken from the operation
    total_fee: Amount,
    /// Portion accruing to the factory admin (receives any remainder)
    admin_cut: Amount,
    /// Portion accruing to the referral, zero when none was supplied
    referral_cut: Amount,
    /// Referral account, if one was supplied and non-zero
    referral: Option<Address>,
}

impl FeeSplit {
    /// Split a fee charged on traded value: `value * fee_bps / 10_000`
    pub fn on_value(
        value: Amount,
        fee_bps: Bps,
        referral_share_bps: Bps,
        referral: Option<Address>,
    ) -> MarketResult<Self> {
        let total_fee = value
            .checked_mul(fee_bps as Amount)
            .ok_or(MarketError::Overflow)?
            / MAX_BPS as Amount;
        Self::of_fee(total_fee, referral_share_bps, referral)
    }

    /// Split an already-fixed fee (e.g. the creation fee)
    pub fn of_fee(
        total_fee: Amount,
        referral_share_bps: Bps,
        referral: Option<Address>,
    ) -> MarketResult<Self> {
        let referral = referral.filter(|addr| !addr.is_zero());
        let referral_cut = match referral {
            Some(_) => {
                total_fee
                    .checked_mul(referral_share_bps as Amount)
                    .ok_or(MarketError::Overflow)?
                    / MAX_BPS as Amount
            }
            None => 0,
        };
        // Remainder goes to the admin
        let admin_cut = total_fee
            .checked_sub(referral_cut)
            .ok_or_else(|| conservation_err(total_fee, referral_cut))?;

        Ok(Self {
            total_fee,
            admin_cut,
            referral_cut,
            referral,
        })
    }

    pub const fn total_fee(&self) -> Amount {
        self.total_fee
    }

    pub const fn admin_cut(&self) -> Amount {
        self.admin_cut
    }

    pub const fn referral_cut(&self) -> Amount {
        self.referral_cut
    }

    pub const fn referral(&self) -> Option<Address> {
        self.referral
    }
}

fn conservation_err(total_fee: Amount, referral_cut: Amount) -> MarketError {
    MarketError::ConservationViolated(format!(
        "referral cut {} exceeds fee {}",
        referral_cut, total_fee
    ))
}

// ============================================================================
// FEE LEDGER
// ============================================================================

/// Running totals of fees collected per recipient
///
/// Accumulation is append-only; balances decrease only through the explicit
/// `withdraw` operation. `audit` verifies that every unit collected is still
/// accounted for: collected == retained + withdrawn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeLedger {
    collected_total: Amount,
    withdrawn_total: Amount,
    accrued: HashMap<Address, Amount>,
}

impl FeeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a split: the admin cut accrues to `admin`, the referral cut to
    /// the split's referral account
    pub fn record(&mut self, split: &FeeSplit, admin: Address) -> MarketResult<()> {
        self.collected_total = self
            .collected_total
            .checked_add(split.total_fee())
            .ok_or(MarketError::Overflow)?;

        let admin_entry = self.accrued.entry(admin).or_insert(0);
        *admin_entry = admin_entry
            .checked_add(split.admin_cut())
            .ok_or(MarketError::Overflow)?;

        if let Some(referral) = split.referral() {
            let entry = self.accrued.entry(referral).or_insert(0);
            *entry = entry
                .checked_add(split.referral_cut())
                .ok_or(MarketError::Overflow)?;
        }
        Ok(())
    }

    /// Fees accrued and not yet withdrawn by an account
    pub fn accrued(&self, account: &Address) -> Amount {
        self.accrued.get(account).copied().unwrap_or(0)
    }

    /// Total fees ever collected
    pub const fn collected_total(&self) -> Amount {
        self.collected_total
    }

    /// Debit `amount` from an account's accrued fees
    pub fn withdraw(&mut self, account: &Address, amount: Amount) -> MarketResult<()> {
        let held = self.accrued(account);
        if held < amount {
            return Err(MarketError::InsufficientBalance {
                have: held,
                need: amount,
            });
        }
        self.accrued.insert(*account, held - amount);
        self.withdrawn_total = self
            .withdrawn_total
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        Ok(())
    }

    /// Verify conservation: value in == value distributed + value retained
    pub fn audit(&self) -> MarketResult<()> {
        let retained: Amount = self.accrued.values().sum();
        let accounted = retained
            .checked_add(self.withdrawn_total)
            .ok_or(MarketError::Overflow)?;
        if accounted != self.collected_total {
            return Err(MarketError::ConservationViolated(format!(
                "collected {} != retained {} + withdrawn {}",
                self.collected_total, retained, self.withdrawn_total
            )));
        }
        Ok(())
    }
}
