// src/app.rs
use anyhow::{bail, Context, Result};
use ethers_core::types::U256;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::application::{SwapIntent, SwapPipeline};
use crate::config::Config;
use crate::domain::guard::{GuardPolicy, TradeGuard, DEFAULT_COOLDOWN_SECS};
use crate::domain::rebalance::{PoolRotation, Rebalancer};
use crate::domain::trader::TraderStore;
use crate::infrastructure::memory::{InMemoryPools, PoolState, StaticPriceOracle};
use crate::report::{self, RunReport};
use crate::shared::types::{Address, PoolKey};

/// Fully parsed run configuration, CLI overrides already applied
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub cooldown_seconds: u64,
    pub denylist: Vec<Address>,
    pub rotation: Vec<PoolKey>,
    pub pools: Vec<(PoolKey, PoolState)>,
    pub oracle_prices: HashMap<PoolKey, U256>,
    pub swaps: Vec<SwapIntent>,
    pub report_path: Option<PathBuf>,
}

impl AppCfg {
    pub fn from_config(
        cfg: Config,
        cooldown_override: Option<u64>,
        report_path: Option<PathBuf>,
    ) -> Result<Self> {
        if cfg.pools.is_empty() {
            bail!("config defines no pools");
        }

        let cooldown_seconds = cooldown_override
            .or_else(|| cfg.guard.as_ref().and_then(|g| g.cooldown_seconds))
            .unwrap_or(DEFAULT_COOLDOWN_SECS);

        let denylist = cfg
            .guard
            .as_ref()
            .and_then(|g| g.denylist.clone())
            .unwrap_or_default()
            .into_iter()
            .map(Address::new)
            .collect();

        let rotation = cfg.rotation.iter().cloned().map(PoolKey::new).collect();

        let pools = cfg
            .pools
            .iter()
            .map(|pool| {
                let sqrt_price_x96 = U256::from_dec_str(&pool.sqrt_price_x96)
                    .with_context(|| format!("parse sqrt price for pool {}", pool.key))?;
                Ok((
                    PoolKey::new(pool.key.clone()),
                    PoolState {
                        reserve0: u128::from(pool.reserve0),
                        reserve1: u128::from(pool.reserve1),
                        liquidity: u128::from(pool.liquidity),
                        sqrt_price_x96,
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let oracle_prices = cfg
            .oracle
            .iter()
            .map(|(pool, price)| {
                let price = U256::from_dec_str(price)
                    .with_context(|| format!("parse oracle price for pool {pool}"))?;
                Ok((PoolKey::new(pool.clone()), price))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        let swaps = cfg
            .swaps
            .iter()
            .map(|swap| {
                let new_sqrt_price_x96 = U256::from_dec_str(&swap.sqrt_price_x96_after)
                    .with_context(|| format!("parse post-swap sqrt price for {}", swap.pool))?;
                Ok(SwapIntent {
                    trader: Address::new(swap.trader.clone()),
                    pool: PoolKey::new(swap.pool.clone()),
                    sequence: swap.sequence,
                    time: swap.time,
                    deltas: crate::shared::types::SwapDeltas::new(
                        i128::from(swap.amount0_delta),
                        i128::from(swap.amount1_delta),
                    ),
                    new_sqrt_price_x96,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            cooldown_seconds,
            denylist,
            rotation,
            pools,
            oracle_prices,
            swaps,
            report_path,
        })
    }
}

/// Wire the in-memory collaborators and drive the configured swaps
/// through the pipeline
pub async fn run(cfg: AppCfg) -> Result<()> {
    let pools = Arc::new(InMemoryPools::new());
    for (key, state) in &cfg.pools {
        pools.insert(key.clone(), state.clone());
    }
    let oracle = Arc::new(StaticPriceOracle::with_prices(cfg.oracle_prices.clone()));

    let mut policy = GuardPolicy::new(cfg.cooldown_seconds).context("invalid cooldown")?;
    for address in &cfg.denylist {
        policy.set_blocked(address.clone(), true);
    }
    let policy = Arc::new(RwLock::new(policy));

    let store = Arc::new(TraderStore::new());
    let guard = TradeGuard::new(policy.clone(), store, oracle, pools.clone());
    let rebalancer = Rebalancer::new(
        pools.clone(),
        pools.clone(),
        PoolRotation::from_cycle(&cfg.rotation),
    );
    let pipeline = SwapPipeline::new(guard, rebalancer, pools.clone(), policy);

    info!(
        pools = cfg.pools.len(),
        swaps = cfg.swaps.len(),
        cooldown_seconds = cfg.cooldown_seconds,
        "starting guarded swap run"
    );

    let mut results = Vec::with_capacity(cfg.swaps.len());
    for (i, intent) in cfg.swaps.iter().enumerate() {
        let outcome = pipeline
            .process(intent)
            .await
            .with_context(|| format!("swap {i} from {} failed fatally", intent.trader))?;
        results.push((intent.clone(), outcome));
    }

    let run_report = RunReport::new(cfg.cooldown_seconds, &results);
    info!(
        accepted = run_report.summary.accepted,
        rejected = run_report.summary.rejected,
        rebalances = run_report.summary.rebalances,
        "run finished"
    );

    match &cfg.report_path {
        Some(path) => {
            report::write_report(path, &run_report)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{}", serde_json::to_string_pretty(&run_report)?),
    }
    Ok(())
}
