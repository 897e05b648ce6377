//! In-memory pool state
//!
//! One mutexed map standing in for the host's pool machinery; it backs
//! the reader, executor and mover seams at once so a simulation or test
//! sees a single consistent state.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ethers_core::types::U256;
use tracing::debug;

use crate::domain::pool::{LiquidityDirection, LiquidityMover, PoolReserveReader, SwapExecutor};
use crate::shared::errors::PoolError;
use crate::shared::types::{PoolKey, SwapDeltas};

/// Mutable state of one pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub reserve0: u128,
    pub reserve1: u128,
    pub liquidity: u128,
    pub sqrt_price_x96: U256,
}

#[derive(Debug, Default)]
pub struct InMemoryPools {
    pools: Mutex<HashMap<PoolKey, PoolState>>,
}

impl InMemoryPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: PoolKey, state: PoolState) {
        self.pools
            .lock()
            .expect("pool state lock poisoned")
            .insert(key, state);
    }

    /// Copy of a pool's current state, if the pool exists
    pub fn snapshot(&self, key: &PoolKey) -> Option<PoolState> {
        self.pools
            .lock()
            .expect("pool state lock poisoned")
            .get(key)
            .cloned()
    }

    pub fn set_reserves(&self, key: &PoolKey, reserve0: u128, reserve1: u128) -> Result<(), PoolError> {
        self.with_pool(key, |pool| {
            pool.reserve0 = reserve0;
            pool.reserve1 = reserve1;
            Ok(())
        })
    }

    pub fn set_sqrt_price(&self, key: &PoolKey, sqrt_price_x96: U256) -> Result<(), PoolError> {
        self.with_pool(key, |pool| {
            pool.sqrt_price_x96 = sqrt_price_x96;
            Ok(())
        })
    }

    fn with_pool<T>(
        &self,
        key: &PoolKey,
        f: impl FnOnce(&mut PoolState) -> Result<T, PoolError>,
    ) -> Result<T, PoolError> {
        let mut pools = self.pools.lock().expect("pool state lock poisoned");
        let pool = pools
            .get_mut(key)
            .ok_or_else(|| PoolError::PoolNotFound(key.to_string()))?;
        f(pool)
    }
}

#[async_trait]
impl PoolReserveReader for InMemoryPools {
    async fn get_slot0(&self, pool: &PoolKey) -> Result<U256, PoolError> {
        self.with_pool(pool, |state| Ok(state.sqrt_price_x96))
    }

    async fn get_reserves(&self, pool: &PoolKey) -> Result<(u128, u128), PoolError> {
        self.with_pool(pool, |state| Ok((state.reserve0, state.reserve1)))
    }

    async fn get_liquidity(&self, pool: &PoolKey) -> Result<u128, PoolError> {
        self.with_pool(pool, |state| Ok(state.liquidity))
    }
}

#[async_trait]
impl SwapExecutor for InMemoryPools {
    async fn apply_swap(
        &self,
        pool: &PoolKey,
        deltas: SwapDeltas,
        new_sqrt_price_x96: U256,
    ) -> Result<(), PoolError> {
        self.with_pool(pool, |state| {
            state.reserve0 = apply_delta(state.reserve0, deltas.amount0)?;
            state.reserve1 = apply_delta(state.reserve1, deltas.amount1)?;
            state.sqrt_price_x96 = new_sqrt_price_x96;
            Ok(())
        })?;
        debug!(%pool, ?deltas, "swap applied");
        Ok(())
    }
}

#[async_trait]
impl LiquidityMover for InMemoryPools {
    async fn modify_position(
        &self,
        pool: &PoolKey,
        amount: u128,
        direction: LiquidityDirection,
        beneficiary: &PoolKey,
    ) -> Result<(), PoolError> {
        let (from, to) = match direction {
            LiquidityDirection::Withdraw => (pool, beneficiary),
            LiquidityDirection::Deposit => (beneficiary, pool),
        };
        if from == to {
            return Ok(());
        }

        // both sides validated before either is touched, under one lock
        let mut pools = self.pools.lock().expect("pool state lock poisoned");
        let new_from = pools
            .get(from)
            .ok_or_else(|| PoolError::PoolNotFound(from.to_string()))?
            .liquidity
            .checked_sub(amount)
            .ok_or_else(|| PoolError::MoveFailed(format!("{from} holds too little liquidity")))?;
        let new_to = pools
            .get(to)
            .ok_or_else(|| PoolError::PoolNotFound(to.to_string()))?
            .liquidity
            .checked_add(amount)
            .ok_or_else(|| PoolError::MoveFailed(format!("liquidity overflow on {to}")))?;
        pools.get_mut(from).expect("validated above").liquidity = new_from;
        pools.get_mut(to).expect("validated above").liquidity = new_to;

        debug!(%from, %to, amount, "liquidity moved");
        Ok(())
    }
}

fn apply_delta(reserve: u128, delta: i128) -> Result<u128, PoolError> {
    let updated = if delta >= 0 {
        reserve.checked_add(delta as u128)
    } else {
        reserve.checked_sub(delta.unsigned_abs())
    };
    updated.ok_or_else(|| PoolError::InvalidPoolData(format!("reserve {reserve} cannot absorb delta {delta}")))
}
