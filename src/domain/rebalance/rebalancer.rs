//! Post-trade reserve correction
//!
//! After the host applies a swap it reports the signed reserve deltas
//! here. If either reserve dropped below 95% of its pre-trade value, a
//! tenth of the pool's liquidity is moved to the next pool in the
//! rotation. The evaluate-and-move sequence is one critical section;
//! a reentrant call fails instead of proceeding.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::pool::{LiquidityDirection, LiquidityMover, PoolReserveReader};
use crate::domain::rebalance::PoolRotation;
use crate::math;
use crate::shared::errors::RebalanceError;
use crate::shared::types::{PoolKey, SwapDeltas};

/// A corrective liquidity movement the rebalancer carried out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceInstruction {
    pub source_pool: PoolKey,
    pub target_pool: PoolKey,
    pub amount: u128,
}

/// Outcome of a post-trade evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebalanceOutcome {
    NoAction,
    Rebalanced(RebalanceInstruction),
}

pub struct Rebalancer {
    reader: Arc<dyn PoolReserveReader>,
    mover: Arc<dyn LiquidityMover>,
    rotation: PoolRotation,
    // single-flight token covering the whole evaluate-and-move sequence
    in_flight: Mutex<()>,
}

impl Rebalancer {
    pub fn new(
        reader: Arc<dyn PoolReserveReader>,
        mover: Arc<dyn LiquidityMover>,
        rotation: PoolRotation,
    ) -> Self {
        Self {
            reader,
            mover,
            rotation,
            in_flight: Mutex::new(()),
        }
    }

    /// Inspect `pool` after a swap applied `deltas` and correct its
    /// composition if a reserve dropped too far.
    ///
    /// Trader records are never touched here. A reconstructed pre-trade
    /// reserve that is not positive means the reported deltas are
    /// inconsistent with pool state and is a fatal error.
    pub async fn evaluate(
        &self,
        pool: &PoolKey,
        deltas: SwapDeltas,
    ) -> Result<RebalanceOutcome, RebalanceError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| RebalanceError::ReentrantCall)?;

        let (reserve0, reserve1) = self.reader.get_reserves(pool).await?;
        let pre0 = pre_trade_reserve(pool, "reserve0", reserve0, deltas.amount0)?;
        let pre1 = pre_trade_reserve(pool, "reserve1", reserve1, deltas.amount1)?;

        let skewed = math::reserve_dropped_below_floor(reserve0, pre0)
            || math::reserve_dropped_below_floor(reserve1, pre1);
        if !skewed {
            debug!(%pool, reserve0, reserve1, "reserves within tolerance");
            return Ok(RebalanceOutcome::NoAction);
        }

        let Some(target) = self.rotation.target_for(pool) else {
            warn!(%pool, "skewed pool is outside the rotation, skipping correction");
            return Ok(RebalanceOutcome::NoAction);
        };

        let liquidity = self.reader.get_liquidity(pool).await?;
        let amount = math::rebalance_amount(liquidity);
        self.mover
            .modify_position(pool, amount, LiquidityDirection::Withdraw, target)
            .await?;
        info!(%pool, %target, amount, "moved liquidity out of skewed pool");

        Ok(RebalanceOutcome::Rebalanced(RebalanceInstruction {
            source_pool: pool.clone(),
            target_pool: target.clone(),
            amount,
        }))
    }
}

/// Reconstruct one side's pre-trade reserve from the post-trade value
/// and the signed delta the swap applied
fn pre_trade_reserve(
    pool: &PoolKey,
    side: &'static str,
    post: u128,
    delta: i128,
) -> Result<u128, RebalanceError> {
    let pre = if delta >= 0 {
        post.checked_sub(delta as u128)
    } else {
        post.checked_add(delta.unsigned_abs())
    };
    match pre {
        Some(value) if value > 0 => Ok(value),
        _ => Err(RebalanceError::ReserveIntegrity {
            pool: pool.clone(),
            side,
            post,
            delta,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::{InMemoryPools, PoolState};
    use async_trait::async_trait;
    use ethers_core::types::U256;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;

    use crate::shared::errors::PoolError;

    fn seeded_pools() -> Arc<InMemoryPools> {
        let pools = Arc::new(InMemoryPools::new());
        for key in ["pool-a", "pool-b", "pool-c", "pool-d"] {
            pools.insert(
                PoolKey::from(key),
                PoolState {
                    reserve0: 1_000,
                    reserve1: 1_000,
                    liquidity: 500,
                    sqrt_price_x96: U256::from(1u64) << 96,
                },
            );
        }
        pools
    }

    fn rotation() -> PoolRotation {
        let cycle: Vec<PoolKey> = ["pool-a", "pool-b", "pool-c", "pool-d"]
            .into_iter()
            .map(PoolKey::from)
            .collect();
        PoolRotation::from_cycle(&cycle)
    }

    fn rebalancer_over(pools: &Arc<InMemoryPools>) -> Rebalancer {
        Rebalancer::new(pools.clone(), pools.clone(), rotation())
    }

    #[tokio::test]
    async fn test_six_percent_drop_triggers_rebalance() {
        let pools = seeded_pools();
        let pool = PoolKey::from("pool-a");
        // post-trade reserve0 940 against a reconstructed pre of 1000 -> 94%
        pools.set_reserves(&pool, 940, 1_000).unwrap();

        let rebalancer = rebalancer_over(&pools);
        let outcome = rebalancer
            .evaluate(&pool, SwapDeltas::new(-60, 0))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RebalanceOutcome::Rebalanced(RebalanceInstruction {
                source_pool: pool.clone(),
                target_pool: PoolKey::from("pool-b"),
                amount: 50, // a tenth of the pool's 500 liquidity
            })
        );
        // the mover actually shifted liquidity one hop forward
        assert_eq!(pools.snapshot(&pool).unwrap().liquidity, 450);
        assert_eq!(pools.snapshot(&PoolKey::from("pool-b")).unwrap().liquidity, 550);
    }

    #[tokio::test]
    async fn test_four_percent_drop_is_tolerated() {
        let pools = seeded_pools();
        let pool = PoolKey::from("pool-a");
        pools.set_reserves(&pool, 960, 1_000).unwrap();

        let rebalancer = rebalancer_over(&pools);
        let outcome = rebalancer
            .evaluate(&pool, SwapDeltas::new(-40, 0))
            .await
            .unwrap();

        assert_eq!(outcome, RebalanceOutcome::NoAction);
        assert_eq!(pools.snapshot(&pool).unwrap().liquidity, 500);
    }

    #[tokio::test]
    async fn test_skew_on_second_reserve_also_triggers() {
        let pools = seeded_pools();
        let pool = PoolKey::from("pool-c");
        pools.set_reserves(&pool, 1_000, 900).unwrap();

        let rebalancer = rebalancer_over(&pools);
        let outcome = rebalancer
            .evaluate(&pool, SwapDeltas::new(0, -100))
            .await
            .unwrap();

        match outcome {
            RebalanceOutcome::Rebalanced(instruction) => {
                assert_eq!(instruction.target_pool, PoolKey::from("pool-d"));
            }
            other => panic!("expected a rebalance, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_positive_pre_trade_reserve_is_fatal() {
        let pools = seeded_pools();
        let pool = PoolKey::from("pool-a");

        // delta equal to the whole post-trade reserve -> pre of zero
        let err = rebalancer_over(&pools)
            .evaluate(&pool, SwapDeltas::new(1_000, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::ReserveIntegrity { side: "reserve0", .. }
        ));

        // delta larger than the reserve -> negative pre
        let err = rebalancer_over(&pools)
            .evaluate(&pool, SwapDeltas::new(0, 2_000))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RebalanceError::ReserveIntegrity { side: "reserve1", .. }
        ));
    }

    #[tokio::test]
    async fn test_pool_outside_rotation_is_left_alone() {
        let pools = seeded_pools();
        let stray = PoolKey::from("pool-x");
        pools.insert(
            stray.clone(),
            PoolState {
                reserve0: 900,
                reserve1: 1_000,
                liquidity: 500,
                sqrt_price_x96: U256::from(1u64) << 96,
            },
        );

        let outcome = rebalancer_over(&pools)
            .evaluate(&stray, SwapDeltas::new(-100, 0))
            .await
            .unwrap();
        assert_eq!(outcome, RebalanceOutcome::NoAction);
        assert_eq!(pools.snapshot(&stray).unwrap().liquidity, 500);
    }

    /// Mover that calls back into the rebalancer, the way a malicious
    /// callee would, and records what the nested call was told.
    struct ReentrantMover {
        rebalancer: OnceLock<Arc<Rebalancer>>,
        saw_reentrant_rejection: AtomicBool,
    }

    #[async_trait]
    impl LiquidityMover for ReentrantMover {
        async fn modify_position(
            &self,
            pool: &PoolKey,
            _amount: u128,
            _direction: LiquidityDirection,
            _beneficiary: &PoolKey,
        ) -> Result<(), PoolError> {
            let rebalancer = self.rebalancer.get().expect("rebalancer not wired");
            let nested = rebalancer.evaluate(pool, SwapDeltas::new(-60, 0)).await;
            if matches!(nested, Err(RebalanceError::ReentrantCall)) {
                self.saw_reentrant_rejection.store(true, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_nested_invocation_is_refused() {
        let pools = seeded_pools();
        let pool = PoolKey::from("pool-a");
        pools.set_reserves(&pool, 940, 1_000).unwrap();

        let mover = Arc::new(ReentrantMover {
            rebalancer: OnceLock::new(),
            saw_reentrant_rejection: AtomicBool::new(false),
        });
        let rebalancer = Arc::new(Rebalancer::new(pools.clone(), mover.clone(), rotation()));
        mover
            .rebalancer
            .set(rebalancer.clone())
            .ok()
            .expect("wired twice");

        let outcome = rebalancer
            .evaluate(&pool, SwapDeltas::new(-60, 0))
            .await
            .unwrap();
        assert!(matches!(outcome, RebalanceOutcome::Rebalanced(_)));
        assert!(mover.saw_reentrant_rejection.load(Ordering::SeqCst));
    }
}
