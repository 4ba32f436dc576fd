//! Market and Factory Errors
//!
//! Every error is reported synchronously and leaves all ledgers untouched;
//! a failed call is indistinguishable, from the ledger's perspective, from a
//! call that never happened.

use lib_curve::CurveError;
use lib_types::{Amount, MarketId};
use thiserror::Error;

/// Error during market or factory operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("Creation fee not paid: paid {paid}, required {required}")]
    FeeNotPaid { paid: Amount, required: Amount },

    #[error("Insufficient payment: paid {paid}, required {required}")]
    InsufficientPayment { paid: Amount, required: Amount },

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },

    #[error("Zero amount not allowed")]
    InvalidAmount,

    #[error("Sell amount {amount} exceeds supply sold {supply_sold}")]
    AmountExceedsSupply { amount: Amount, supply_sold: Amount },

    #[error("Supply cap exceeded: cap {cap}, would have {would_have}")]
    SupplyCapExceeded { cap: Amount, would_have: Amount },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Market not found: {0:?}")]
    MarketNotFound(MarketId),

    #[error("Market index {index} out of bounds (registry has {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value transfer failed: {0}")]
    Transfer(String),

    #[error("Conservation invariant violated: {0}")]
    ConservationViolated(String),
}

impl From<CurveError> for MarketError {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::ZeroAmount => MarketError::InvalidAmount,
            CurveError::AmountExceedsSupply {
                amount,
                supply_sold,
            } => MarketError::AmountExceedsSupply {
                amount,
                supply_sold,
            },
            CurveError::Overflow => MarketError::Overflow,
            CurveError::InvalidParameters(msg) => MarketError::InvalidConfig(msg),
        }
    }
}

/// Result type for market operations
pub type MarketResult<T> = Result<T, MarketError>;
