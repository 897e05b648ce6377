//! Error handling for the application

use thiserror::Error;

use crate::shared::types::PoolKey;

/// Reasons the pre-trade guard refuses a swap.
///
/// Each variant is a distinct outcome returned to the caller inside
/// `Verdict::Reject`, never raised as a generic fault.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    #[error("address is blocked as a bot")]
    BotBlocked,

    #[error("second trade from the same address in one execution slot")]
    SandwichDetected,

    #[error("cooldown between trades not met")]
    CooldownNotMet,

    #[error("pool price moved more than 1% since the address's last trade")]
    MevDetected,

    /// Skewed reserves are corrected after the trade instead of blocking it;
    /// the variant stays in the taxonomy for callers that surface reasons.
    #[error("pool reserves out of balance")]
    LiquidityImbalance,

    /// Fail-closed outcome: a price read failed, so the trade is refused.
    #[error("price data unavailable")]
    PriceUnavailable,
}

/// Price-oracle collaborator failures
#[derive(Error, Debug, Clone)]
pub enum OracleError {
    #[error("price feed unavailable")]
    FeedUnavailable,

    #[error("invalid price data: {0}")]
    InvalidPriceData(String),
}

/// Pool-state collaborator failures
#[derive(Error, Debug, Clone)]
pub enum PoolError {
    #[error("pool not found: {0}")]
    PoolNotFound(String),

    #[error("invalid pool data: {0}")]
    InvalidPoolData(String),

    #[error("liquidity move failed: {0}")]
    MoveFailed(String),
}

/// Exact numeric conversion failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("price overflow when squaring sqrt price")]
    PriceOverflow,
}

/// Post-trade rebalancer failures.
///
/// These are fatal conditions, kept separate from the guard's expected
/// rejections so callers never confuse the two.
#[derive(Error, Debug)]
pub enum RebalanceError {
    #[error("pre-trade {side} for pool {pool} is non-positive (post-trade {post}, delta {delta})")]
    ReserveIntegrity {
        pool: PoolKey,
        side: &'static str,
        post: u128,
        delta: i128,
    },

    #[error("rebalance already in progress")]
    ReentrantCall,

    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Administrative policy violations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    #[error("cooldown {0}s exceeds the 60s ceiling")]
    CooldownTooLong(u64),
}

/// Failures while driving one swap through the guard/rebalance pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("swap execution failed: {0}")]
    Execution(#[from] PoolError),

    #[error(transparent)]
    Rebalance(#[from] RebalanceError),
}
