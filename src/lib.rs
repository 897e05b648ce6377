//! Poolwarden - AMM swap guard and pool rebalancer
//! Built with Domain-Driven Design principles

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod math;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::SwapPipeline;
pub use domain::guard::{GuardPolicy, TradeGuard, Verdict};
pub use domain::rebalance::{PoolRotation, Rebalancer};
pub use domain::trader::TraderStore;
