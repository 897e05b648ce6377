//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading address as seen by the host ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Opaque identity of a liquidity pool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey(pub String);

impl PoolKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Signed reserve changes an executed swap applied to a pool,
/// from the pool's perspective (negative = outflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDeltas {
    pub amount0: i128,
    pub amount1: i128,
}

impl SwapDeltas {
    pub fn new(amount0: i128, amount1: i128) -> Self {
        Self { amount0, amount1 }
    }
}
