//! Host Collaborator Traits
//!
//! The engine does not move value or token units itself; it is driven by a
//! host environment (call dispatch, account management, durable token
//! bookkeeping) through these two seams.
//!
//! # Contract
//!
//! The engine calls `debit` and `burn_from` only after all validation has
//! passed, and calls them *before* any ledger commit; they are the only
//! fallible side effects of an operation. `credit` and `mint_to` are called
//! after the commit and must not fail for inputs the engine has validated;
//! their `Result` exists for host-internal faults, which the host must
//! surface by rolling back the whole call (the host owns call atomicity).

use lib_types::{Address, Amount, MarketId};

use crate::errors::{MarketError, MarketResult};

/// Atomic value-transfer primitive supplied by the host
pub trait ValueTransfer {
    /// Remove `amount` value units from `account`; fails if the account
    /// holds less than `amount` at the call site
    fn debit(&self, account: &Address, amount: Amount) -> MarketResult<()>;

    /// Add `amount` value units to `account`
    fn credit(&self, account: &Address, amount: Amount) -> MarketResult<()>;
}

/// Token-unit accounting primitive supplied by the host
pub trait TokenAccounting {
    /// Create `units` of `market`'s token in `account`
    fn mint_to(&self, market: &MarketId, account: &Address, units: Amount) -> MarketResult<()>;

    /// Destroy `units` of `market`'s token held by `account`; fails if the
    /// account holds fewer units
    fn burn_from(&self, market: &MarketId, account: &Address, units: Amount) -> MarketResult<()>;

    /// Query how many units of `market`'s token `account` holds
    fn balance_of(&self, market: &MarketId, account: &Address) -> MarketResult<Amount>;
}

/// Both host seams in one bound, for callers that pass a single host handle
pub trait Host: ValueTransfer + TokenAccounting {}

impl<T: ValueTransfer + TokenAccounting> Host for T {}

// ============================================================================
// IN-MEMORY HOST (TESTING)
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory host for testing
///
/// Thread-safe so concurrency tests can share one host across trades.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    value_balances: Mutex<HashMap<Address, Amount>>,
    token_balances: Mutex<HashMap<(MarketId, Address), Amount>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with value units
    pub fn fund(&self, account: Address, amount: Amount) {
        let mut balances = lock(&self.value_balances);
        *balances.entry(account).or_insert(0) += amount;
    }

    /// Current value balance of an account
    pub fn value_balance(&self, account: &Address) -> Amount {
        lock(&self.value_balances)
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all value balances (for conservation checks in tests)
    pub fn total_value(&self) -> Amount {
        lock(&self.value_balances).values().sum()
    }
}

impl ValueTransfer for InMemoryHost {
    fn debit(&self, account: &Address, amount: Amount) -> MarketResult<()> {
        let mut balances = lock(&self.value_balances);
        let held = balances.get(account).copied().unwrap_or(0);
        if held < amount {
            return Err(MarketError::Transfer(format!(
                "debit of {} from {} exceeds balance {}",
                amount, account, held
            )));
        }
        balances.insert(*account, held - amount);
        Ok(())
    }

    fn credit(&self, account: &Address, amount: Amount) -> MarketResult<()> {
        let mut balances = lock(&self.value_balances);
        let entry = balances.entry(*account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or(MarketError::Overflow)?;
        Ok(())
    }
}

impl TokenAccounting for InMemoryHost {
    fn mint_to(&self, market: &MarketId, account: &Address, units: Amount) -> MarketResult<()> {
        let mut balances = lock(&self.token_balances);
        let entry = balances.entry((*market, *account)).or_insert(0);
        *entry = entry.checked_add(units).ok_or(MarketError::Overflow)?;
        Ok(())
    }

    fn burn_from(&self, market: &MarketId, account: &Address, units: Amount) -> MarketResult<()> {
        let mut balances = lock(&self.token_balances);
        let held = balances.get(&(*market, *account)).copied().unwrap_or(0);
        if held < units {
            return Err(MarketError::InsufficientBalance {
                have: held,
                need: units,
            });
        }
        balances.insert((*market, *account), held - units);
        Ok(())
    }

    fn balance_of(&self, market: &MarketId, account: &Address) -> MarketResult<Amount> {
        Ok(lock(&self.token_balances)
            .get(&(*market, *account))
            .copied()
            .unwrap_or(0))
    }
}

/// Recover from lock poisoning: every mutation under these locks is a single
/// insert, so a panicking holder cannot leave a half-applied update.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_insufficient() {
        let host = InMemoryHost::new();
        let account = Address::new([1u8; 32]);
        host.fund(account, 100);

        assert!(host.debit(&account, 101).is_err());
        assert_eq!(host.value_balance(&account), 100);

        assert!(host.debit(&account, 100).is_ok());
        assert_eq!(host.value_balance(&account), 0);
    }

    #[test]
    fn test_mint_and_burn() {
        let host = InMemoryHost::new();
        let market = MarketId::from_ordinal(0);
        let account = Address::new([1u8; 32]);

        host.mint_to(&market, &account, 500).unwrap();
        assert_eq!(host.balance_of(&market, &account).unwrap(), 500);

        let err = host.burn_from(&market, &account, 501);
        assert!(matches!(
            err,
            Err(MarketError::InsufficientBalance { have: 500, need: 501 })
        ));

        host.burn_from(&market, &account, 500).unwrap();
        assert_eq!(host.balance_of(&market, &account).unwrap(), 0);
    }
}
