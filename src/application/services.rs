//! Application services and use cases
//!
//! `SwapPipeline` plays the caller role around the guard and the
//! rebalancer: evaluate before the swap, hand accepted swaps to the
//! execution collaborator, evaluate again after. It also exposes the
//! administrative surface over the shared guard policy.

use std::sync::{Arc, RwLock};

use ethers_core::types::U256;
use tracing::info;

use crate::domain::guard::{GuardPolicy, TradeGuard, Verdict};
use crate::domain::pool::SwapExecutor;
use crate::domain::rebalance::{RebalanceOutcome, Rebalancer};
use crate::shared::errors::{PipelineError, PolicyError};
use crate::shared::types::{Address, PoolKey, SwapDeltas};

/// One intended swap as the execution environment would present it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub trader: Address,
    pub pool: PoolKey,
    pub sequence: u64,
    pub time: u64,
    pub deltas: SwapDeltas,
    pub new_sqrt_price_x96: U256,
}

/// What happened to one intent, end to end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub verdict: Verdict,
    /// None when the guard refused the swap and nothing was executed
    pub rebalance: Option<RebalanceOutcome>,
}

pub struct SwapPipeline {
    guard: TradeGuard,
    rebalancer: Rebalancer,
    executor: Arc<dyn SwapExecutor>,
    policy: Arc<RwLock<GuardPolicy>>,
}

impl SwapPipeline {
    pub fn new(
        guard: TradeGuard,
        rebalancer: Rebalancer,
        executor: Arc<dyn SwapExecutor>,
        policy: Arc<RwLock<GuardPolicy>>,
    ) -> Self {
        Self {
            guard,
            rebalancer,
            executor,
            policy,
        }
    }

    /// Drive one swap intent through guard, execution and rebalancer.
    ///
    /// Guard rejections are ordinary outcomes; only execution failures
    /// and fatal rebalancer conditions surface as errors.
    pub async fn process(&self, intent: &SwapIntent) -> Result<SwapOutcome, PipelineError> {
        let verdict = self
            .guard
            .evaluate(&intent.trader, &intent.pool, intent.sequence, intent.time)
            .await;
        if let Verdict::Reject(reason) = verdict {
            info!(trader = %intent.trader, pool = %intent.pool, %reason, "swap refused");
            return Ok(SwapOutcome {
                verdict,
                rebalance: None,
            });
        }

        self.executor
            .apply_swap(&intent.pool, intent.deltas, intent.new_sqrt_price_x96)
            .await?;

        let rebalance = self.rebalancer.evaluate(&intent.pool, intent.deltas).await?;
        Ok(SwapOutcome {
            verdict,
            rebalance: Some(rebalance),
        })
    }

    /// Administrative: flag or unflag `address` on the denylist
    pub fn set_blocked(&self, address: Address, blocked: bool) {
        self.policy
            .write()
            .expect("guard policy lock poisoned")
            .set_blocked(address, blocked);
    }

    /// Administrative: change the cooldown, bounded at the 60s ceiling
    pub fn set_cooldown(&self, seconds: u64) -> Result<(), PolicyError> {
        self.policy
            .write()
            .expect("guard policy lock poisoned")
            .set_cooldown(seconds)
    }
}
