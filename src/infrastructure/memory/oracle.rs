//! Price oracles for simulations and tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ethers_core::types::U256;

use crate::domain::pool::PriceOracle;
use crate::shared::errors::OracleError;
use crate::shared::types::PoolKey;

/// Oracle serving prices from a fixed, settable table
#[derive(Debug, Default)]
pub struct StaticPriceOracle {
    prices: Mutex<HashMap<PoolKey, U256>>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(prices: HashMap<PoolKey, U256>) -> Self {
        Self {
            prices: Mutex::new(prices),
        }
    }

    /// Oracle knowing exactly one pool
    pub fn single(pool: PoolKey, price: U256) -> Self {
        Self::with_prices(HashMap::from([(pool, price)]))
    }

    pub fn set_price(&self, pool: PoolKey, price: U256) {
        self.prices
            .lock()
            .expect("oracle price lock poisoned")
            .insert(pool, price);
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn get_latest_price(&self, pool: &PoolKey) -> Result<U256, OracleError> {
        self.prices
            .lock()
            .expect("oracle price lock poisoned")
            .get(pool)
            .copied()
            .ok_or(OracleError::FeedUnavailable)
    }
}

/// Oracle that always fails; exercises the guard's fail-closed path
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingPriceOracle;

#[async_trait]
impl PriceOracle for FailingPriceOracle {
    async fn get_latest_price(&self, _pool: &PoolKey) -> Result<U256, OracleError> {
        Err(OracleError::FeedUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_oracle_serves_and_updates() {
        let oracle = StaticPriceOracle::single(PoolKey::from("pool-a"), U256::from(100u64));
        assert_eq!(
            oracle.get_latest_price(&PoolKey::from("pool-a")).await.unwrap(),
            U256::from(100u64)
        );

        oracle.set_price(PoolKey::from("pool-a"), U256::from(101u64));
        assert_eq!(
            oracle.get_latest_price(&PoolKey::from("pool-a")).await.unwrap(),
            U256::from(101u64)
        );

        assert!(matches!(
            oracle.get_latest_price(&PoolKey::from("pool-b")).await,
            Err(OracleError::FeedUnavailable)
        ));
    }
}
