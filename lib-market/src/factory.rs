//! Token Factory
//!
//! Registry of markets plus the trade orchestration: every operation
//! resolves and validates with reads and pure math only, performs the single
//! fallible host side effect (the debit or burn that funds it), then commits
//! the ledger and pays out. A failure before the side effect leaves no
//! trace; the commit itself re-checks nothing because the quote already
//! validated every bound.
//!
//! # Concurrency
//!
//! The registry is append-only behind one `RwLock`; each market sits behind
//! its own `RwLock`, so trades against distinct markets never serialize with
//! each other, while two trades on one market always see each other's
//! committed supply. Readers resolve a handle to an `Arc` and drop the
//! registry lock before touching the market.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use lib_types::{Address, Amount, MarketId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::FactoryConfig;
use crate::errors::{MarketError, MarketResult};
use crate::events::{EventSink, FactoryEvent};
use crate::fee_ledger::{FeeLedger, FeeSplit};
use crate::host::{TokenAccounting, ValueTransfer};
use crate::market::{Market, MarketMetadata};

/// Receipt for one committed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub market_id: MarketId,
    /// Units bought or sold
    pub units: Amount,
    /// Exact reserve movement (curve cost on buy, curve refund on sell)
    pub reserve_delta: Amount,
    /// Fee routed out of the trade
    pub fee: Amount,
    /// Value the caller parted with (buy) or received (sell), fee included
    pub net_value: Amount,
    /// Excess payment returned to the buyer, zero on sells
    pub refunded: Amount,
    pub supply_sold_after: Amount,
    pub reserve_after: Amount,
}

#[derive(Default)]
struct Registry {
    markets: Vec<Arc<RwLock<Market>>>,
    by_id: HashMap<MarketId, usize>,
}

/// Factory: market registry, fee routing, and trade orchestration
pub struct TokenFactory {
    admin: Address,
    config: FactoryConfig,
    registry: RwLock<Registry>,
    fees: Mutex<FeeLedger>,
    events: Mutex<Option<Arc<Mutex<dyn EventSink + Send>>>>,
}

impl TokenFactory {
    /// Create a factory; the admin collects the non-referral share of fees
    pub fn new(admin: Address, config: FactoryConfig) -> MarketResult<Self> {
        config.validate()?;
        Ok(Self {
            admin,
            config,
            registry: RwLock::new(Registry::default()),
            fees: Mutex::new(FeeLedger::new()),
            events: Mutex::new(None),
        })
    }

    /// Attach a sink that receives every committed event
    ///
    /// The handle is shared, so callers can keep a clone and inspect what
    /// was recorded.
    pub fn set_event_sink(&self, sink: Arc<Mutex<dyn EventSink + Send>>) {
        *lock(&self.events) = Some(sink);
    }

    pub const fn admin(&self) -> Address {
        self.admin
    }

    pub const fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // ========================================================================
    // CREATION
    // ========================================================================

    /// Create a market; `payment` must equal the creation fee exactly
    pub fn create_market<H: ValueTransfer>(
        &self,
        metadata: MarketMetadata,
        referral: Option<Address>,
        creator: Address,
        payment: Amount,
        host: &H,
    ) -> MarketResult<MarketId> {
        if payment != self.config.creation_fee {
            return Err(MarketError::FeeNotPaid {
                paid: payment,
                required: self.config.creation_fee,
            });
        }
        let split = FeeSplit::of_fee(self.config.creation_fee, self.config.referral_share_bps, referral)?;
        metadata.validate()?;

        // The one fallible side effect; nothing has been committed yet.
        host.debit(&creator, payment)?;

        // Short writer lock: the id is the registry ordinal, so assignment
        // and append happen together; readers never see a gap.
        let mut registry = write(&self.registry);
        let index = registry.markets.len();
        let id = MarketId::from_ordinal(index as u64);
        let market = match Market::create(
            id,
            metadata,
            self.config.curve,
            self.config.supply_cap,
            creator,
            referral,
        ) {
            Ok(market) => market,
            Err(err) => {
                drop(registry);
                host.credit(&creator, payment)?;
                return Err(err);
            }
        };
        let name = market.metadata.name.clone();
        let symbol = market.metadata.symbol.clone();
        registry.by_id.insert(id, index);
        registry.markets.push(Arc::new(RwLock::new(market)));
        drop(registry);

        info!(market = %id, symbol = %symbol, "market created");
        self.emit(FactoryEvent::MarketCreated {
            market_id: id,
            name,
            symbol,
            creator,
            creation_fee: payment,
        });
        self.route_fees(id, &split)?;
        Ok(id)
    }

    // ========================================================================
    // TRADING
    // ========================================================================

    /// Buy `amount` units; `payment` must cover the curve cost plus the
    /// trade fee, and any excess is returned to the buyer
    pub fn buy<H: ValueTransfer + TokenAccounting>(
        &self,
        market_id: MarketId,
        amount: Amount,
        buyer: Address,
        referral: Option<Address>,
        payment: Amount,
        host: &H,
    ) -> MarketResult<TradeReceipt> {
        let handle = self.resolve(&market_id)?;
        let mut market = write(&handle);

        let cost = market.quote_buy(amount)?;
        let split = FeeSplit::on_value(
            cost,
            self.config.trade_fee_bps,
            self.config.referral_share_bps,
            referral.or(market.referral),
        )?;
        let required = cost
            .checked_add(split.total_fee())
            .ok_or(MarketError::Overflow)?;
        if payment < required {
            return Err(MarketError::InsufficientPayment {
                paid: payment,
                required,
            });
        }
        let excess = payment - required;

        host.debit(&buyer, payment)?;
        // The quote validated every bound, so the commit cannot fail; the
        // compensation path below keeps the ledger whole even if it ever did.
        let delta = match market.apply_buy(amount) {
            Ok(delta) => delta,
            Err(err) => {
                host.credit(&buyer, payment)?;
                return Err(err);
            }
        };
        self.audit_market(&market);
        drop(market);

        host.mint_to(&market_id, &buyer, amount)?;
        if excess > 0 {
            host.credit(&buyer, excess)?;
        }

        debug!(market = %market_id, units = %amount, cost = %cost, "buy settled");
        self.emit(FactoryEvent::TokensPurchased {
            market_id,
            buyer,
            units: amount,
            cost,
            fee: split.total_fee(),
            supply_sold: delta.supply_sold_after,
            reserve_balance: delta.reserve_after,
        });
        self.route_fees(market_id, &split)?;

        Ok(TradeReceipt {
            market_id,
            units: amount,
            reserve_delta: cost,
            fee: split.total_fee(),
            net_value: required,
            refunded: excess,
            supply_sold_after: delta.supply_sold_after,
            reserve_after: delta.reserve_after,
        })
    }

    /// Sell `amount` units; the caller receives the curve refund minus the
    /// trade fee
    pub fn sell<H: ValueTransfer + TokenAccounting>(
        &self,
        market_id: MarketId,
        amount: Amount,
        seller: Address,
        referral: Option<Address>,
        host: &H,
    ) -> MarketResult<TradeReceipt> {
        let handle = self.resolve(&market_id)?;
        let mut market = write(&handle);

        let held = host.balance_of(&market_id, &seller)?;
        if held < amount {
            return Err(MarketError::InsufficientBalance {
                have: held,
                need: amount,
            });
        }
        let refund = market.quote_sell(amount)?;
        let split = FeeSplit::on_value(
            refund,
            self.config.trade_fee_bps,
            self.config.referral_share_bps,
            referral.or(market.referral),
        )?;
        let proceeds = refund
            .checked_sub(split.total_fee())
            .ok_or(MarketError::Overflow)?;

        host.burn_from(&market_id, &seller, amount)?;
        let delta = match market.apply_sell(amount) {
            Ok(delta) => delta,
            Err(err) => {
                host.mint_to(&market_id, &seller, amount)?;
                return Err(err);
            }
        };
        self.audit_market(&market);
        drop(market);

        host.credit(&seller, proceeds)?;

        debug!(market = %market_id, units = %amount, proceeds = %proceeds, "sell settled");
        self.emit(FactoryEvent::TokensSold {
            market_id,
            seller,
            units: amount,
            proceeds,
            fee: split.total_fee(),
            supply_sold: delta.supply_sold_after,
            reserve_balance: delta.reserve_after,
        });
        self.route_fees(market_id, &split)?;

        Ok(TradeReceipt {
            market_id,
            units: amount,
            reserve_delta: refund,
            fee: split.total_fee(),
            net_value: proceeds,
            refunded: 0,
            supply_sold_after: delta.supply_sold_after,
            reserve_after: delta.reserve_after,
        })
    }

    // ========================================================================
    // LOOKUP & ENUMERATION
    // ========================================================================

    /// All market handles in creation order
    pub fn list_markets(&self) -> Vec<MarketId> {
        let registry = read(&self.registry);
        registry
            .markets
            .iter()
            .map(|m| read(m).id)
            .collect()
    }

    /// Handle of the market at a creation-order index
    pub fn get_market(&self, index: usize) -> MarketResult<MarketId> {
        let registry = read(&self.registry);
        registry
            .markets
            .get(index)
            .map(|m| read(m).id)
            .ok_or(MarketError::IndexOutOfBounds {
                index,
                len: registry.markets.len(),
            })
    }

    /// Point-in-time copy of a market's metadata and ledger
    pub fn market_snapshot(&self, market_id: &MarketId) -> MarketResult<Market> {
        let handle = self.resolve(market_id)?;
        let market = read(&handle);
        Ok(market.clone())
    }

    pub fn market_count(&self) -> usize {
        read(&self.registry).markets.len()
    }

    // ========================================================================
    // FEES
    // ========================================================================

    /// Fees accrued to an account and not yet withdrawn
    pub fn fees_accrued(&self, account: &Address) -> Amount {
        lock(&self.fees).accrued(account)
    }

    /// Total fees ever collected by the factory
    pub fn fees_collected_total(&self) -> Amount {
        lock(&self.fees).collected_total()
    }

    /// Pay out accrued fees to an account through the host
    ///
    /// The only path by which fee value leaves the factory.
    pub fn withdraw_fees<H: ValueTransfer>(
        &self,
        account: &Address,
        amount: Amount,
        host: &H,
    ) -> MarketResult<()> {
        let mut fees = lock(&self.fees);
        fees.withdraw(account, amount)?;
        host.credit(account, amount)?;
        fees.audit()
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn resolve(&self, market_id: &MarketId) -> MarketResult<Arc<RwLock<Market>>> {
        let registry = read(&self.registry);
        let index = registry
            .by_id
            .get(market_id)
            .copied()
            .ok_or(MarketError::MarketNotFound(*market_id))?;
        Ok(Arc::clone(&registry.markets[index]))
    }

    /// Accrue fee cuts in the ledger. The debited fee stays with the factory
    /// until the recipient calls `withdraw_fees`; accruing without a host
    /// credit is what keeps value conserved.
    fn route_fees(&self, market_id: MarketId, split: &FeeSplit) -> MarketResult<()> {
        if split.total_fee() == 0 {
            return Ok(());
        }
        lock(&self.fees).record(split, self.admin)?;
        self.emit(FactoryEvent::FeesRouted {
            market_id,
            admin_cut: split.admin_cut(),
            referral_cut: split.referral_cut(),
            referral: split.referral(),
        });
        Ok(())
    }

    fn audit_market(&self, market: &Market) {
        if let Err(err) = market.audit() {
            warn!(market = %market.id, %err, "post-trade audit failed");
        }
    }

    fn emit(&self, event: FactoryEvent) {
        let sink = lock(&self.events).clone();
        if let Some(sink) = sink {
            lock(&sink).record(event);
        }
    }
}

/// Lock helpers: recover from poisoning, since every commit under these
/// locks is all-or-nothing and cannot be observed half-applied.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read<T>(rwlock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(rwlock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
