//! Canonical Primitive Types for Ledger State
//!
//! Rule: No String identifiers in ledger state. Ever.
//!
//! Accounts and markets are referenced by fixed 32-byte identifiers; all
//! value and unit quantities use a single unsigned integer type wide enough
//! that intermediate curve arithmetic cannot silently wrap.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Value and token amounts, in the smallest denomination
/// (supports wei-scale reserves and raw token units alike)
pub type Amount = u128;

/// Basis points for percentage calculations (10000 = 100%)
pub type Bps = u16;

/// Maximum basis points (100%)
pub const MAX_BPS: Bps = 10_000;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// 32-byte account reference
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Create a new Address from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a zeroed Address (the "no account" sentinel)
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// MARKET TYPES
// ============================================================================

/// 32-byte market handle
///
/// Assigned once at creation by the factory and stable for the lifetime of
/// the registry; identity survives independent of any single owner.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Default)]
pub struct MarketId(pub [u8; 32]);

impl MarketId {
    /// Create a new MarketId from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive the handle for the n-th created market (0-indexed)
    ///
    /// The creation ordinal is embedded big-endian in the trailing bytes, so
    /// handles sort in creation order.
    pub fn from_ordinal(ordinal: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&ordinal.to_be_bytes());
        Self(bytes)
    }

    /// Get the underlying bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarketId({})", hex::encode(&self.0[24..]))
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for MarketId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for MarketId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// ============================================================================
// TESTS
// ============================================================================
