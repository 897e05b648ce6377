use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::{fs, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct GuardCfg {
    pub cooldown_seconds: Option<u64>,
    pub denylist: Option<Vec<String>>,
}

// TOML integers are 64-bit; values are widened to the domain's 128-bit
// types when the AppCfg is built
#[derive(Debug, Clone, Deserialize)]
pub struct PoolCfg {
    pub key: String,
    pub reserve0: u64,
    pub reserve1: u64,
    pub liquidity: u64,
    /// sqrtPriceX96 as a decimal string (too wide for TOML integers)
    pub sqrt_price_x96: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwapCfg {
    pub trader: String,
    pub pool: String,
    pub sequence: u64,
    pub time: u64,
    pub amount0_delta: i64,
    pub amount1_delta: i64,
    pub sqrt_price_x96_after: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub guard: Option<GuardCfg>,
    /// Ordered rebalance cycle; the last pool wraps to the first
    pub rotation: Vec<String>,
    pub pools: Vec<PoolCfg>,
    /// Reference prices per pool, decimal strings
    #[serde(default)]
    pub oracle: HashMap<String, String>,
    #[serde(default)]
    pub swaps: Vec<SwapCfg>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse Config.toml")?;
        Ok(cfg)
    }
}
