//! Factory Events
//!
//! Every successful state change produces an event. The engine hands events
//! to an `EventSink`; durable emission (logs, indexes, subscriptions) is the
//! host's concern.

use lib_types::{Address, Amount, MarketId};
use serde::{Deserialize, Serialize};

/// Launchpad events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FactoryEvent {
    /// Market registered by the factory
    MarketCreated {
        market_id: MarketId,
        name: String,
        symbol: String,
        creator: Address,
        creation_fee: Amount,
    },

    /// Units bought from a market's curve
    TokensPurchased {
        market_id: MarketId,
        buyer: Address,
        units: Amount,
        cost: Amount,
        fee: Amount,
        supply_sold: Amount,
        reserve_balance: Amount,
    },

    /// Units sold back to a market's curve
    TokensSold {
        market_id: MarketId,
        seller: Address,
        units: Amount,
        proceeds: Amount,
        fee: Amount,
        supply_sold: Amount,
        reserve_balance: Amount,
    },

    /// Fee routed to the admin and/or a referral
    FeesRouted {
        market_id: MarketId,
        admin_cut: Amount,
        referral_cut: Amount,
        referral: Option<Address>,
    },
}

impl FactoryEvent {
    /// Get the market this event belongs to
    pub fn market_id(&self) -> &MarketId {
        match self {
            FactoryEvent::MarketCreated { market_id, .. } => market_id,
            FactoryEvent::TokensPurchased { market_id, .. } => market_id,
            FactoryEvent::TokensSold { market_id, .. } => market_id,
            FactoryEvent::FeesRouted { market_id, .. } => market_id,
        }
    }

    /// Get event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            FactoryEvent::MarketCreated { .. } => "market_created",
            FactoryEvent::TokensPurchased { .. } => "tokens_purchased",
            FactoryEvent::TokensSold { .. } => "tokens_sold",
            FactoryEvent::FeesRouted { .. } => "fees_routed",
        }
    }
}

impl std::fmt::Display for FactoryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactoryEvent::MarketCreated {
                market_id, symbol, ..
            } => {
                write!(f, "MarketCreated({:?}, {})", market_id, symbol)
            }
            FactoryEvent::TokensPurchased {
                market_id,
                units,
                cost,
                ..
            } => write!(f, "TokensPurchased({:?}, units={}, cost={})", market_id, units, cost),
            FactoryEvent::TokensSold {
                market_id,
                units,
                proceeds,
                ..
            } => write!(
                f,
                "TokensSold({:?}, units={}, proceeds={})",
                market_id, units, proceeds
            ),
            FactoryEvent::FeesRouted {
                market_id,
                admin_cut,
                referral_cut,
                ..
            } => write!(
                f,
                "FeesRouted({:?}, admin={}, referral={})",
                market_id, admin_cut, referral_cut
            ),
        }
    }
}

/// Event sink interface
///
/// Implement this to receive every committed state change for indexing.
pub trait EventSink {
    /// Record a new event
    fn record(&mut self, event: FactoryEvent);
}

/// In-memory event sink for testing
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    events: Vec<FactoryEvent>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[FactoryEvent] {
        &self.events
    }

    /// All events for one market
    pub fn market_events(&self, market_id: &MarketId) -> Vec<&FactoryEvent> {
        self.events
            .iter()
            .filter(|e| e.market_id() == market_id)
            .collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&mut self, event: FactoryEvent) {
        self.events.push(event);
    }
}
