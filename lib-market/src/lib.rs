//! Bonding-curve market engine
//!
//! Markets issue tokens priced along a deterministic curve: the reserve a
//! market holds always equals the curve integral over its sold supply, so
//! buying and selling the same units moves the exact same value and the
//! system never strands or invents funds.
//!
//! The [`TokenFactory`] owns the market registry, gates creation behind an
//! exact fee, routes fee cuts between admin and referral, and orchestrates
//! trades against a [`host`] that settles value and token balances.

pub mod config;
pub mod errors;
pub mod events;
pub mod factory;
pub mod fee_ledger;
pub mod host;
pub mod market;

pub use config::FactoryConfig;
pub use errors::{MarketError, MarketResult};
pub use events::{EventSink, FactoryEvent, InMemoryEventSink};
pub use factory::{TokenFactory, TradeReceipt};
pub use fee_ledger::{FeeLedger, FeeSplit};
pub use host::{Host, InMemoryHost, TokenAccounting, ValueTransfer};
pub use market::{LedgerDelta, Market, MarketMetadata};
