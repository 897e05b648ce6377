//! Pre-trade admission checks
//!
//! Every intended swap passes through `TradeGuard::evaluate` before the
//! host applies it. Checks run in a fixed order and short-circuit on the
//! first failure; trader history is written only when a trade is accepted.

use std::sync::{Arc, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::guard::GuardPolicy;
use crate::domain::pool::{PoolReserveReader, PriceOracle};
use crate::domain::trader::{TraderRecord, TraderStore};
use crate::math;
use crate::shared::errors::RejectReason;
use crate::shared::types::{Address, PoolKey};

/// Outcome of a pre-trade evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

pub struct TradeGuard {
    policy: Arc<RwLock<GuardPolicy>>,
    store: Arc<TraderStore>,
    oracle: Arc<dyn PriceOracle>,
    reader: Arc<dyn PoolReserveReader>,
    // serializes evaluations so the per-address read-modify-write is atomic
    eval_lock: Mutex<()>,
}

impl TradeGuard {
    pub fn new(
        policy: Arc<RwLock<GuardPolicy>>,
        store: Arc<TraderStore>,
        oracle: Arc<dyn PriceOracle>,
        reader: Arc<dyn PoolReserveReader>,
    ) -> Self {
        Self {
            policy,
            store,
            oracle,
            reader,
            eval_lock: Mutex::new(()),
        }
    }

    /// Decide whether `trader` may swap against `pool` right now.
    ///
    /// `current_sequence` and `current_time` come from the execution
    /// environment and are trusted. A price read failure rejects the
    /// trade (fail closed) rather than letting it through unchecked.
    pub async fn evaluate(
        &self,
        trader: &Address,
        pool: &PoolKey,
        current_sequence: u64,
        current_time: u64,
    ) -> Verdict {
        let _serial = self.eval_lock.lock().await;

        let (blocked, cooldown_seconds) = {
            let policy = self.policy.read().expect("guard policy lock poisoned");
            (policy.is_blocked(trader), policy.cooldown_seconds())
        };
        if blocked {
            debug!(%trader, "rejected: address is denylisted");
            return Verdict::Reject(RejectReason::BotBlocked);
        }

        let record = self.store.get(trader);

        if record.last_trade_sequence != 0 && record.last_trade_sequence == current_sequence {
            debug!(%trader, current_sequence, "rejected: repeat trade in one slot");
            return Verdict::Reject(RejectReason::SandwichDetected);
        }

        if record.last_trade_time != 0
            && current_time < record.last_trade_time.saturating_add(cooldown_seconds)
        {
            debug!(
                %trader,
                last_trade_time = record.last_trade_time,
                current_time,
                cooldown_seconds,
                "rejected: cooldown not met"
            );
            return Verdict::Reject(RejectReason::CooldownNotMet);
        }

        // The oracle price is read on every evaluation for observability;
        // the deviation check itself compares against the pool's own price.
        let oracle_price = match self.oracle.get_latest_price(pool).await {
            Ok(price) => price,
            Err(err) => {
                warn!(%pool, %err, "oracle read failed, failing closed");
                return Verdict::Reject(RejectReason::PriceUnavailable);
            }
        };

        let sqrt_price = match self.reader.get_slot0(pool).await {
            Ok(sqrt_price) => sqrt_price,
            Err(err) => {
                warn!(%pool, %err, "pool price read failed, failing closed");
                return Verdict::Reject(RejectReason::PriceUnavailable);
            }
        };
        let pool_price = match math::price_from_sqrt_price_x96(sqrt_price) {
            Ok(price) => price,
            Err(err) => {
                warn!(%pool, %err, "pool price not representable, failing closed");
                return Verdict::Reject(RejectReason::PriceUnavailable);
            }
        };
        debug!(%pool, %oracle_price, %pool_price, "reference prices");

        if !record.last_trade_price.is_zero()
            && math::price_deviation_exceeded(record.last_trade_price, pool_price)
        {
            debug!(
                %trader,
                last_price = %record.last_trade_price,
                %pool_price,
                "rejected: price deviation beyond tolerance"
            );
            return Verdict::Reject(RejectReason::MevDetected);
        }

        self.store.set(
            trader,
            TraderRecord::new(current_sequence, pool_price, current_time),
        );
        debug!(%trader, %pool, current_sequence, "trade accepted");
        Verdict::Accept
    }
}
