//! Collaborator interface traits
//!
//! The guard and rebalancer never touch pool state directly; everything
//! flows through these seams so the host execution environment (or an
//! in-memory double) can be injected.

use async_trait::async_trait;
use ethers_core::types::U256;

use crate::shared::errors::{OracleError, PoolError};
use crate::shared::types::{PoolKey, SwapDeltas};

/// External price reference for a pool
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Latest reference price for `pool` (unsigned, fixed precision)
    async fn get_latest_price(&self, pool: &PoolKey) -> Result<U256, OracleError>;
}

/// Read access to a pool's priced state
#[async_trait]
pub trait PoolReserveReader: Send + Sync {
    /// Current sqrt price of `pool` in X96 fixed point
    async fn get_slot0(&self, pool: &PoolKey) -> Result<U256, PoolError>;

    /// Current (reserve0, reserve1) of `pool`
    async fn get_reserves(&self, pool: &PoolKey) -> Result<(u128, u128), PoolError>;

    /// Current total liquidity of `pool`
    async fn get_liquidity(&self, pool: &PoolKey) -> Result<u128, PoolError>;
}

/// Direction of a liquidity move relative to the pool it names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityDirection {
    Withdraw,
    Deposit,
}

/// Executes liquidity movements between pools. Fire-and-forget from the
/// rebalancer's point of view: success or a propagated failure.
#[async_trait]
pub trait LiquidityMover: Send + Sync {
    async fn modify_position(
        &self,
        pool: &PoolKey,
        amount: u128,
        direction: LiquidityDirection,
        beneficiary: &PoolKey,
    ) -> Result<(), PoolError>;
}

/// Applies an already-quoted swap to pool state. The guard decides,
/// this collaborator executes.
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn apply_swap(
        &self,
        pool: &PoolKey,
        deltas: SwapDeltas,
        new_sqrt_price_x96: U256,
    ) -> Result<(), PoolError>;
}
